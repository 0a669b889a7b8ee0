//! 统一的环境变量管理系统
//!
//! 所有变量都以 `WIKITRANS_` 为前缀，提供类型安全、可验证的读取方式。
//! 配置文件中的值可以被这里的变量覆盖，命令行参数再覆盖环境变量。

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 只在变量被显式设置时返回值，用于覆盖配置；值无效时记录警告并忽略
    fn lookup() -> Option<T> {
        let value = env::var(Self::NAME).ok()?;
        match Self::parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("忽略无效的环境变量: {}", e);
                None
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "WIKITRANS_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 启用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }

    /// 工作线程数
    pub struct Workers;
    impl EnvVar<usize> for Workers {
        const NAME: &'static str = "WIKITRANS_WORKERS";
        const DEFAULT: Option<usize> = None;
        const DESCRIPTION: &'static str = "Worker threads for translation and image downloads";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 64)
        }
    }

    /// 资源目录
    pub struct AssetDir;
    impl EnvVar<String> for AssetDir {
        const NAME: &'static str = "WIKITRANS_ASSET_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory (relative to the output file) for localized images";

        fn parse(value: &str) -> EnvResult<String> {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Directory must not be empty".to_string(),
                });
            }
            Ok(dir.to_string())
        }
    }
}

/// 网络相关环境变量
pub mod network {
    use super::*;

    /// 请求超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "WIKITRANS_TIMEOUT";
        const DEFAULT: Option<Duration> = None;
        const DESCRIPTION: &'static str = "Network request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 600)
        }
    }

    /// User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "WIKITRANS_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header sent with page and image requests";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 翻译功能启用状态
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "WIKITRANS_TRANSLATION_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Enable translation functionality";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "WIKITRANS_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language for translation (ISO 639-1 code)";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim().to_lowercase();
            // 允许带地区后缀，例如 zh-tw
            let primary = lang.split('-').next().unwrap_or_default();
            if primary.len() != 2 || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must start with 2 letters (ISO 639-1)".to_string(),
                });
            }
            Ok(lang)
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "WIKITRANS_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language for translation ('auto' for detection)";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim().to_lowercase();
            if lang == "auto" || lang.len() == 2 {
                Ok(lang)
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must be 'auto' or 2 characters (ISO 639-1)"
                        .to_string(),
                })
            }
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "WIKITRANS_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 最大并发请求数
    pub struct MaxConcurrentRequests;
    impl EnvVar<usize> for MaxConcurrentRequests {
        const NAME: &'static str = "WIKITRANS_MAX_CONCURRENT_REQUESTS";
        const DEFAULT: Option<usize> = None;
        const DESCRIPTION: &'static str = "Maximum concurrent requests to translation API";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100)
        }
    }

    /// 最大重试次数
    pub struct MaxRetryAttempts;
    impl EnvVar<usize> for MaxRetryAttempts {
        const NAME: &'static str = "WIKITRANS_MAX_RETRY_ATTEMPTS";
        const DEFAULT: Option<usize> = None;
        const DESCRIPTION: &'static str = "Attempts per translation request, including the first";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 10)
        }
    }

    /// 单次请求最大文本长度
    pub struct MaxTextLength;
    impl EnvVar<usize> for MaxTextLength {
        const NAME: &'static str = "WIKITRANS_MAX_TEXT_LENGTH";
        const DEFAULT: Option<usize> = None;
        const DESCRIPTION: &'static str = "Texts longer than this are split into sentences";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 50, 50000)
        }
    }

    /// 术语表路径
    pub struct Glossary;
    impl EnvVar<String> for Glossary {
        const NAME: &'static str = "WIKITRANS_GLOSSARY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "JSON glossary applied before translation";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(shellexpand::tilde(value.trim()).into_owned())
        }
    }

    /// 本地缓存条目数
    pub struct CacheSize;
    impl EnvVar<usize> for CacheSize {
        const NAME: &'static str = "WIKITRANS_CACHE_SIZE";
        const DEFAULT: Option<usize> = None;
        const DESCRIPTION: &'static str = "Number of translations kept in the in-memory cache";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1_000_000)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, max: u64) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds == 0 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }

    if seconds > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Timeout too long (max {} seconds)", max),
        });
    }

    Ok(Duration::from_secs(seconds))
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    let entries: &[(&str, &str)] = &[
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION),
        (core::Workers::NAME, core::Workers::DESCRIPTION),
        (core::AssetDir::NAME, core::AssetDir::DESCRIPTION),
        (network::Timeout::NAME, network::Timeout::DESCRIPTION),
        (network::UserAgent::NAME, network::UserAgent::DESCRIPTION),
        (translation::Enabled::NAME, translation::Enabled::DESCRIPTION),
        (translation::TargetLang::NAME, translation::TargetLang::DESCRIPTION),
        (translation::SourceLang::NAME, translation::SourceLang::DESCRIPTION),
        (translation::ApiUrl::NAME, translation::ApiUrl::DESCRIPTION),
        (
            translation::MaxConcurrentRequests::NAME,
            translation::MaxConcurrentRequests::DESCRIPTION,
        ),
        (
            translation::MaxRetryAttempts::NAME,
            translation::MaxRetryAttempts::DESCRIPTION,
        ),
        (translation::MaxTextLength::NAME, translation::MaxTextLength::DESCRIPTION),
        (translation::Glossary::NAME, translation::Glossary::DESCRIPTION),
        (translation::CacheSize::NAME, translation::CacheSize::DESCRIPTION),
    ];

    for (name, description) in entries {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(translation::Enabled::parse("true").unwrap());
        assert!(translation::Enabled::parse("YES").unwrap());
        assert!(!translation::Enabled::parse("off").unwrap());
        assert!(translation::Enabled::parse("maybe").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(translation::ApiUrl::parse("http://localhost:1188/translate").is_ok());
        assert!(translation::ApiUrl::parse("ftp://example.com").is_err());
    }

    #[test]
    fn test_language_validation() {
        assert_eq!(translation::TargetLang::parse(" ZH ").unwrap(), "zh");
        assert_eq!(translation::TargetLang::parse("zh-TW").unwrap(), "zh-tw");
        assert!(translation::TargetLang::parse("chinese").is_err());
        assert_eq!(translation::SourceLang::parse("auto").unwrap(), "auto");
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(core::Workers::parse("8").unwrap(), 8);
        assert!(core::Workers::parse("0").is_err());
        assert!(core::Workers::parse("many").is_err());
        assert_eq!(
            network::Timeout::parse("30").unwrap(),
            Duration::from_secs(30)
        );
        assert!(network::Timeout::parse("0").is_err());
    }

    #[test]
    fn test_lookup_only_when_set() {
        env::remove_var(translation::MaxTextLength::NAME);
        assert_eq!(translation::MaxTextLength::lookup(), None);

        env::set_var(translation::MaxTextLength::NAME, "500");
        assert_eq!(translation::MaxTextLength::lookup(), Some(500));

        env::set_var(translation::MaxTextLength::NAME, "tiny");
        assert_eq!(translation::MaxTextLength::lookup(), None);

        env::remove_var(translation::MaxTextLength::NAME);
    }

    #[test]
    fn test_docs_list_every_variable() {
        let docs = generate_env_docs();
        assert!(docs.contains("WIKITRANS_API_URL"));
        assert!(docs.contains("WIKITRANS_LOG_LEVEL"));
    }
}
