//! # 网络模块
//!
//! 这个模块包含处理流程依赖的外部协作者：
//!
//! - 页面渲染（把 URL 变成完整标记）
//! - 图片资源抓取
//! - 远程调用的有界重试
//!
//! # 模块组织
//!
//! - `renderer` - 渲染器接口
//! - `fetcher` - 抓取器接口
//! - `retry` - 指数退避重试策略
//! - `session` - 基于 reqwest 的 HTTP 会话，同时实现渲染器和抓取器

pub mod fetcher;
pub mod renderer;
pub mod retry;
pub mod session;

// Re-export commonly used items for convenience
pub use fetcher::{FetchError, Fetcher};
pub use renderer::{RenderError, Renderer};
pub use retry::RetryPolicy;
pub use session::{Session, SessionOptions};
