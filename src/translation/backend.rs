//! 翻译后端
//!
//! [`Translator`] 是正文改写阶段唯一依赖的翻译接口。库自带两个实现：
//! 调用 DeepLX 兼容接口的 [`DeeplxTranslator`]，以及原样返回文本的
//! [`IdentityTranslator`]（用于只提取、不翻译的运行）。

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::error::{TranslationError, TranslationResult};

/// 翻译器：阻塞调用，可以被多个工作线程同时使用
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str)
        -> TranslationResult<String>;

    fn name(&self) -> &str {
        "translator"
    }
}

/// DeepLX 请求体
#[derive(Debug, Serialize)]
pub struct DeepLXRequest<'a> {
    pub text: &'a str,
    pub source_lang: &'a str,
    pub target_lang: &'a str,
}

/// DeepLX 响应体
#[derive(Debug, Deserialize)]
pub struct DeepLXResponse {
    pub code: u16,
    #[serde(default)]
    pub data: Option<String>,
}

pub struct DeeplxTranslator {
    client: Client,
    api_url: String,
}

impl DeeplxTranslator {
    pub fn new(api_url: &str, timeout: Duration) -> TranslationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl Translator for DeeplxTranslator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let request = DeepLXRequest {
            text,
            source_lang: &source_lang.to_uppercase(),
            target_lang: &target_lang.to_uppercase(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()?
            .error_for_status()?;

        let body: DeepLXResponse = response.json()?;
        match body.code {
            200 => body
                .data
                .filter(|data| !data.trim().is_empty())
                .ok_or(TranslationError::EmptyResult),
            429 => Err(TranslationError::RateLimitExceeded),
            code => Err(TranslationError::ServiceStatus(code)),
        }
    }

    fn name(&self) -> &str {
        "deeplx"
    }
}

/// 原样返回文本
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, text: &str, _source_lang: &str, _target_lang: &str) -> TranslationResult<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "identity"
    }
}
