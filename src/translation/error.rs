//! 翻译模块统一错误处理

use thiserror::Error;

/// 翻译错误类型
///
/// 翻译失败在正文改写阶段会被转换为“保留原文”，不会中止运行；
/// 只有配置错误会在启动时直接返回给调用方。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 服务返回非成功状态
    #[error("翻译服务返回状态 {0}")]
    ServiceStatus(u16),

    /// 速率限制错误
    #[error("请求速率过快，已达到限制")]
    RateLimitExceeded,

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 响应解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 服务返回了空译文
    #[error("翻译结果为空")]
    EmptyResult,

    /// 术语表错误
    #[error("术语表错误: {0}")]
    GlossaryError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::TimeoutError(_) => true,
            TranslationError::RateLimitExceeded => true,
            TranslationError::ServiceStatus(status) => *status >= 500,
            TranslationError::ConfigError(_) => false,
            TranslationError::ParseError(_) => false,
            TranslationError::EmptyResult => false,
            TranslationError::GlossaryError(_) => false,
        }
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::TimeoutError(error.to_string())
        } else if error.is_decode() {
            TranslationError::ParseError(error.to_string())
        } else if let Some(status) = error.status() {
            if status.as_u16() == 429 {
                TranslationError::RateLimitExceeded
            } else {
                TranslationError::ServiceStatus(status.as_u16())
            }
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

/// 翻译结果类型
pub type TranslationResult<T> = Result<T, TranslationError>;
