//! # wikitrans
//!
//! 提取渲染后维基页面的正文，翻译全部文本，把图片保存到本地，
//! 最后组装成一个带固定样式的独立 HTML 文件。
//!
//! ## 模块组织
//!
//! - `core` - 处理流程、选项、运行报告和致命错误
//! - `parsers` - 锚点定位、边界遍历、图片本地化、链接改写、序列化
//! - `network` - 渲染器与抓取器接口、HTTP 会话、重试策略
//! - `translation` - 文本收集、翻译服务、术语表、正文改写
//! - `builders` - 输出文档组装
//! - `utils` - URL 处理、原子写入、工作线程池
//! - `env` - `WIKITRANS_*` 环境变量
//!
//! ```rust,no_run
//! use wikitrans::core::{process_page, Collaborators, WikiOptions};
//! use wikitrans::network::{Session, SessionOptions};
//! use wikitrans::translation::TranslationService;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new(SessionOptions::default())?;
//! let collaborators = Collaborators::with_session(session, TranslationService::identity());
//! let report = process_page(
//!     "https://en.tankiwiki.com/Crystals",
//!     "%title%.html",
//!     WikiOptions::default(),
//!     collaborators,
//! )?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod translation;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::{
    format_output_path, parse_target, process_page, Collaborators, DocumentProcessor, RunReport,
    WarningKind, WikiError, WikiOptions,
};
pub use builders::{DocumentAssembler, DocumentStyle};
pub use network::{Fetcher, Renderer, Session, SessionOptions};
pub use parsers::{AnchorSpec, BoundaryPolicy, Region};
pub use translation::{TranslationConfig, TranslationService, Translator};
