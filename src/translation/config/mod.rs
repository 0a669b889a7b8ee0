//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    // 默认API设置
    pub const DEFAULT_API_URL: &str = "http://localhost:1188/translate";
    pub const DEFAULT_SOURCE_LANG: &str = "auto";
    pub const DEFAULT_TARGET_LANG: &str = "zh";
    pub const DEFAULT_MAX_TEXT_LENGTH: usize = 990;
    pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;
    pub const DEFAULT_MAX_RETRY_ATTEMPTS: usize = 5;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    // 缓存设置
    pub const DEFAULT_LOCAL_CACHE_SIZE: usize = 4096;

    // 跳过的父元素 class
    pub const DEFAULT_SKIP_CLASSES: &[&str] = &["hotkey"];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "wikitrans.toml",
        ".wikitrans.toml",
        "wikitrans.json",
        "~/.config/wikitrans/config.toml",
        "/etc/wikitrans/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置；失败时记录警告并使用默认配置
pub fn load_translation_config(target_lang: &str, api_url: Option<&str>) -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.create_simple_config(target_lang, api_url),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            TranslationConfig::default_with_lang(target_lang, api_url)
        }
    }
}
