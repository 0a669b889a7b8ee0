//! HTTP 会话
//!
//! `Session` 持有一个阻塞的 reqwest 客户端，同时实现 [`Renderer`] 和 [`Fetcher`]：
//! 页面和图片共享连接池。`file://` URL 直接从磁盘读取，便于处理离线保存的页面。

use std::fs;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::parsers::html::dom::{decode_markup, html_to_dom};
use crate::parsers::html::metadata::get_charset;

use super::fetcher::{FetchError, Fetcher};
use super::renderer::{RenderError, Renderer};
use super::retry::RetryPolicy;

pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// All known non-"text/..." plaintext media types
const PLAINTEXT_MEDIA_TYPES: &[&str] = &[
    "application/xhtml+xml",
    "application/xml",
];

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub user_agent: Option<String>,
    pub timeout: Duration,
    pub insecure: bool,
    /// 读取页面标记之前的固定等待时间
    pub settle_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
            settle_delay: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct Session {
    client: Client,
    options: SessionOptions,
}

impl Session {
    pub fn new(options: SessionOptions) -> Result<Session, reqwest::Error> {
        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure)
            .user_agent(
                options
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .build()?;

        Ok(Session { client, options })
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// 发送 GET 请求，返回响应体和 Content-Type
    fn get(&self, url: &Url) -> Result<(Vec<u8>, Option<String>), FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok((body.to_vec(), content_type))
    }

    fn get_with_retry(&self, url: &Url) -> Result<(Vec<u8>, Option<String>), FetchError> {
        self.options.retry.run(
            url.as_str(),
            |_| self.get(url),
            FetchError::is_retryable,
        )
    }
}

impl Renderer for Session {
    fn render(&self, url: &Url) -> Result<String, RenderError> {
        match url.scheme() {
            "http" | "https" => {
                tracing::info!("获取页面: {}", url);
                let (data, content_type) = self.options.retry.run(
                    url.as_str(),
                    |_| self.get(url).map_err(|e| render_error(url, e)),
                    RenderError::is_retryable,
                )?;

                let (media_type, charset, _) =
                    parse_content_type(content_type.as_deref().unwrap_or("text/html"));
                if !is_plaintext_media_type(&media_type) {
                    return Err(RenderError::UnsupportedMediaType(media_type));
                }

                if !self.options.settle_delay.is_zero() {
                    tracing::debug!("等待页面稳定 {:?}", self.options.settle_delay);
                    thread::sleep(self.options.settle_delay);
                }

                Ok(decode_document(&data, &charset))
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| RenderError::UnsupportedScheme(url.scheme().to_string()))?;
                tracing::info!("读取本地页面: {}", path.display());
                let data = fs::read(&path).map_err(|source| RenderError::Io { path, source })?;
                Ok(decode_document(&data, ""))
            }
            other => Err(RenderError::UnsupportedScheme(other.to_string())),
        }
    }

    fn shutdown(&self) {
        tracing::debug!("关闭 HTTP 会话");
    }
}

fn render_error(url: &Url, error: FetchError) -> RenderError {
    match error {
        FetchError::Status(status) => RenderError::Status {
            url: url.to_string(),
            status,
        },
        other => RenderError::Network {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}

impl Fetcher for Session {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        match url.scheme() {
            "http" | "https" => self.get_with_retry(url).map(|(data, _)| data),
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| FetchError::UnsupportedScheme(url.scheme().to_string()))?;
                Ok(fs::read(path)?)
            }
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// 解码页面字节
///
/// 先按传输层给出的字符集（缺省 UTF-8）解码；文档内 `<meta>` 声明了其他可识别的
/// 字符集时，按声明重新解码。
pub fn decode_document(data: &[u8], header_charset: &str) -> String {
    let header_charset = if header_charset.is_empty() {
        "utf-8"
    } else {
        header_charset
    };
    let markup = decode_markup(data, header_charset);

    let declared = get_charset(&html_to_dom(&markup).document).filter(|c| !c.is_empty());
    match declared {
        Some(charset)
            if !charset.eq_ignore_ascii_case(header_charset)
                && encoding_rs::Encoding::for_label_no_replacement(charset.as_bytes())
                    .is_some() =>
        {
            decode_markup(data, &charset)
        }
        _ => markup,
    }
}

/// Parses Content-Type header value
pub fn parse_content_type(content_type: &str) -> (String, String, bool) {
    let mut media_type = String::new();
    let mut charset = String::new();
    let mut is_base64 = false;

    let parts: Vec<&str> = content_type.split(';').collect();

    if !parts.is_empty() {
        media_type = parts[0].trim().to_lowercase();
    }

    for part in parts.iter().skip(1) {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("charset=") {
            charset = value.trim_matches('"').to_string();
        } else if part == "base64" {
            is_base64 = true;
        }
    }

    (media_type, charset, is_base64)
}

/// Checks if the given media type represents plaintext content
pub fn is_plaintext_media_type(media_type: &str) -> bool {
    media_type.starts_with("text/") || PLAINTEXT_MEDIA_TYPES.contains(&media_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_errors_keep_retry_classification() {
        let url = Url::parse("https://wiki.example/Page").unwrap();
        assert!(render_error(&url, FetchError::Status(502)).is_retryable());
        assert!(render_error(&url, FetchError::Network("reset".to_string())).is_retryable());
        assert!(!render_error(&url, FetchError::Status(404)).is_retryable());
        assert!(matches!(
            render_error(&url, FetchError::Status(404)),
            RenderError::Status { status: 404, .. }
        ));
    }

    #[test]
    fn test_parse_content_type_basic() {
        let (media_type, charset, is_base64) = parse_content_type("text/html");
        assert_eq!(media_type, "text/html");
        assert_eq!(charset, "");
        assert!(!is_base64);
    }

    #[test]
    fn test_parse_content_type_complex() {
        let (media_type, charset, is_base64) =
            parse_content_type("text/html; charset=\"utf-8\"; boundary=something");
        assert_eq!(media_type, "text/html");
        assert_eq!(charset, "utf-8");
        assert!(!is_base64);
    }

    #[test]
    fn test_is_plaintext_media_type() {
        assert!(is_plaintext_media_type("text/html"));
        assert!(is_plaintext_media_type("application/xhtml+xml"));
        assert!(!is_plaintext_media_type("image/png"));
    }

    #[test]
    fn decode_document_follows_meta_charset() {
        let mut data = b"<html><head><meta charset=\"windows-1252\"></head><body>caf".to_vec();
        data.push(0xE9);
        data.extend_from_slice(b"</body></html>");
        assert!(decode_document(&data, "").contains("café"));
    }

    #[test]
    fn local_files_are_rendered_and_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        fs::write(&page, "<p>offline</p>").unwrap();
        let url = Url::from_file_path(&page).unwrap();

        let session = Session::new(SessionOptions::default()).unwrap();
        assert_eq!(session.render(&url).unwrap(), "<p>offline</p>");
        assert_eq!(session.fetch(&url).unwrap(), b"<p>offline</p>");
    }

    #[test]
    fn missing_local_file_is_render_error() {
        let session = Session::new(SessionOptions::default()).unwrap();
        let url = Url::parse("file:///definitely/not/here.html").unwrap();
        assert!(matches!(session.render(&url), Err(RenderError::Io { .. })));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let session = Session::new(SessionOptions::default()).unwrap();
        let url = Url::parse("ftp://wiki.example/page").unwrap();
        assert!(matches!(
            session.render(&url),
            Err(RenderError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            session.fetch(&url),
            Err(FetchError::UnsupportedScheme(_))
        ));
    }
}
