//! 页面渲染协作者
//!
//! 渲染器负责把页面 URL 变成完整的序列化标记。真正的浏览器自动化不在本库内，
//! 调用方可以实现 [`Renderer`] 接入任意浏览器驱动；库自带的
//! [`Session`](super::session::Session) 通过 HTTP 获取标记或读取本地文件。

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// 渲染失败：没有可处理的标记，整个运行中止
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("network error while rendering {url}: {message}")]
    Network { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported media type \"{0}\"")]
    UnsupportedMediaType(String),

    #[error("cannot render URL with scheme \"{0}\"")]
    UnsupportedScheme(String),
}

impl RenderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            RenderError::Network { .. } => true,
            RenderError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// 渲染器：阻塞调用，要么返回完整标记，要么失败，没有部分结果
pub trait Renderer: Send + Sync {
    fn render(&self, url: &Url) -> Result<String, RenderError>;

    /// 释放底层资源（浏览器会话、连接等）；在运行结束时调用，无论成功与否
    fn shutdown(&self) {}
}
