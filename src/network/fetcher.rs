//! 资源抓取协作者

use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported scheme \"{0}\"")]
    UnsupportedScheme(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Status(status) => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// 抓取器：给定绝对 URL，返回资源的原始字节
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}
