//! 翻译模块
//!
//! 把正文区域内的文本节点和 `title`/`alt` 属性翻译为目标语言：
//! - **backend**: 翻译后端接口及 DeepLX 实现
//! - **config**: 配置管理（配置文件、`.env`、环境变量）
//! - **collector**: 按文档顺序收集文本单元
//! - **filters**: 文本过滤、句子切分、空白整理
//! - **glossary**: 术语表预替换
//! - **service**: 带缓存和重试的翻译服务
//! - **rewriter**: 并行翻译并按位置写回
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use wikitrans::parsers::html::boundary::Region;
//! use wikitrans::translation::{rewrite_region, TextCollector, TranslationConfig, TranslationService};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::default_with_lang("zh", None);
//! let service = TranslationService::from_config(config)?;
//!
//! let region = Region::parse("<p>Hello world</p>");
//! let stats = rewrite_region(region.root(), &service, &TextCollector::default());
//! println!("翻译了 {} 个文本单元", stats.translated);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod collector;
pub mod config;
pub mod error;
pub mod filters;
pub mod glossary;
pub mod rewriter;
pub mod service;

pub use backend::{DeeplxTranslator, IdentityTranslator, Translator};
pub use collector::{CollectorConfig, TextCollector, TextUnit};
pub use config::{load_translation_config, ConfigManager, TranslationConfig};
pub use error::{TranslationError, TranslationResult};
pub use glossary::Glossary;
pub use rewriter::{rewrite_region, RewriteStats};
pub use service::TranslationService;
