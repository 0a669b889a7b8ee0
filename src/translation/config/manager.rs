//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub enabled: bool,
    pub target_lang: String,
    pub source_lang: String,
    pub api_url: String,

    // 性能配置
    pub max_text_length: usize,
    pub max_concurrent_requests: usize,
    pub max_retry_attempts: usize,
    pub request_timeout_secs: u64,

    // 缓存配置
    pub local_cache_size: usize,

    // 文本处理
    pub glossary_path: Option<String>,
    pub skip_classes: Vec<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),

            max_text_length: constants::DEFAULT_MAX_TEXT_LENGTH,
            max_concurrent_requests: constants::DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_retry_attempts: constants::DEFAULT_MAX_RETRY_ATTEMPTS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,

            local_cache_size: constants::DEFAULT_LOCAL_CACHE_SIZE,

            glossary_path: None,
            skip_classes: constants::DEFAULT_SKIP_CLASSES
                .iter()
                .map(|class| class.to_string())
                .collect(),
        }
    }
}

impl TranslationConfig {
    /// 创建带指定语言的默认配置
    pub fn default_with_lang(target_lang: &str, api_url: Option<&str>) -> Self {
        let mut config = Self {
            target_lang: target_lang.to_string(),
            ..Self::default()
        };
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        config
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("目标语言不能为空".to_string()));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(TranslationError::ConfigError(format!(
                "API URL 必须以 http:// 或 https:// 开头: {}",
                self.api_url
            )));
        }

        if self.max_concurrent_requests == 0 {
            return Err(TranslationError::ConfigError("最大并发数不能为0".to_string()));
        }

        if self.max_retry_attempts == 0 {
            return Err(TranslationError::ConfigError("重试次数不能为0".to_string()));
        }

        if self.max_text_length < 50 {
            return Err(TranslationError::ConfigError(
                "单次请求最大文本长度不能小于50".to_string(),
            ));
        }

        if self.local_cache_size == 0 {
            return Err(TranslationError::ConfigError("缓存大小不能为0".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖（只覆盖显式设置的变量）
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        if let Some(enabled) = translation::Enabled::lookup() {
            self.enabled = enabled;
        }

        if let Some(target_lang) = translation::TargetLang::lookup() {
            self.target_lang = target_lang;
        }

        if let Some(source_lang) = translation::SourceLang::lookup() {
            self.source_lang = source_lang;
        }

        if let Some(api_url) = translation::ApiUrl::lookup() {
            self.api_url = api_url;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Some(max_concurrent) = translation::MaxConcurrentRequests::lookup() {
            self.max_concurrent_requests = max_concurrent;
        }

        if let Some(attempts) = translation::MaxRetryAttempts::lookup() {
            self.max_retry_attempts = attempts;
        }

        if let Some(length) = translation::MaxTextLength::lookup() {
            self.max_text_length = length;
        }

        if let Some(glossary) = translation::Glossary::lookup() {
            self.glossary_path = Some(glossary);
        }

        if let Some(cache_size) = translation::CacheSize::lookup() {
            self.local_cache_size = cache_size;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 展开 `~` 之后的术语表路径
    pub fn glossary_path(&self) -> Option<PathBuf> {
        self.glossary_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
    }
}

/// 简化的配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 按搜索路径加载配置文件，再应用环境变量覆盖
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let source = Self::find_config_file();
        let mut config = match &source {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                tracing::debug!("未找到配置文件，使用默认配置");
                TranslationConfig::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 从指定文件加载配置（路径支持 `~`），再应用环境变量覆盖
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let path = PathBuf::from(shellexpand::tilde(path).as_ref());
        let mut config = Self::load_from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self {
            config,
            source: Some(path),
        })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 以当前配置为基础，替换目标语言和 API 地址
    pub fn create_simple_config(&self, target_lang: &str, api_url: Option<&str>) -> TranslationConfig {
        let mut config = self.config.clone();
        config.target_lang = target_lang.to_string();
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        config
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &Path) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件 {} 失败: {}", path.display(), e))
        })?;

        // 按扩展名选择格式
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
