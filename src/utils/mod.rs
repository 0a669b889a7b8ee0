//! # 工具模块
//!
//! - `url` - URL 解析、清理以及图片 URL 到本地资源路径的映射
//! - `fs` - 原子文件写入
//! - `workers` - 有界工作线程池

pub mod fs;
pub mod url;
pub mod workers;

// Re-export commonly used items for convenience
pub use fs::write_atomically;
pub use url::{clean_url, is_fetchable, local_asset_path, path_to_href, resolve_url, Url};
pub use workers::WorkerPool;
