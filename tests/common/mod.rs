// 集成测试公共模块
//
// 提供模拟的渲染器、翻译器和抓取器，以及测试页面构造函数

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use wikitrans::core::Collaborators;
use wikitrans::network::fetcher::{FetchError, Fetcher};
use wikitrans::network::renderer::{RenderError, Renderer};
use wikitrans::network::retry::RetryPolicy;
use wikitrans::translation::backend::Translator;
use wikitrans::translation::config::TranslationConfig;
use wikitrans::translation::error::{TranslationError, TranslationResult};
use wikitrans::translation::service::TranslationService;
use wikitrans::utils::url::Url;

pub const PAGE_URL: &str = "https://wiki.example/Test_Page";

/// 包装成带哨兵注释的维基页面
pub fn wiki_page(title: &str, article: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head><body>\
         <div id=\"mw-navigation\"><a href=\"/wiki/Main_Page\">Main Page</a></div>\
         <div id=\"content\"><!-- Title -->{article}</div>\
         <div id=\"footer\">Powered by MediaWiki</div></body></html>"
    )
}

/// 渲染器：返回固定标记，记录是否被释放
pub struct MockRenderer {
    markup: Result<String, u16>,
    delay: Duration,
    pub shut_down: AtomicBool,
}

impl MockRenderer {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: Ok(markup.into()),
            delay: Duration::ZERO,
            shut_down: AtomicBool::new(false),
        }
    }

    /// 每次渲染都返回 HTTP 状态错误
    pub fn failing(status: u16) -> Self {
        Self {
            markup: Err(status),
            delay: Duration::ZERO,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl Renderer for MockRenderer {
    fn render(&self, url: &Url) -> Result<String, RenderError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        match &self.markup {
            Ok(markup) => Ok(markup.clone()),
            Err(status) => Err(RenderError::Status {
                url: url.to_string(),
                status: *status,
            }),
        }
    }

    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

/// 翻译器：按词典翻译，包含 "FAIL" 的文本返回错误，其余原样返回
pub struct PhraseTranslator {
    phrases: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl PhraseTranslator {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            phrases: pairs
                .iter()
                .map(|(source, target)| (source.to_string(), target.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Translator for PhraseTranslator {
    fn translate(&self, text: &str, _source: &str, _target: &str) -> TranslationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("FAIL") {
            return Err(TranslationError::ServiceStatus(503));
        }
        Ok(self
            .phrases
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string()))
    }

    fn name(&self) -> &str {
        "phrasebook"
    }
}

/// 抓取器：返回预先登记的字节，未登记的 URL 返回 404
pub struct MockFetcher {
    resources: HashMap<String, Vec<u8>>,
    pub calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new(resources: &[(&str, &[u8])]) -> Self {
        Self {
            resources: resources
                .iter()
                .map(|(url, data)| (url.to_string(), data.to_vec()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.resources
            .get(url.as_str())
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

/// 常用词典
pub fn phrasebook() -> PhraseTranslator {
    PhraseTranslator::new(&[
        ("Hello world", "你好，世界"),
        ("Logo", "标志"),
        ("Test Page", "测试页面"),
    ])
}

/// 不等待、只尝试一次的翻译服务
pub fn service(translator: impl Translator + 'static) -> TranslationService {
    TranslationService::new(Box::new(translator), TranslationConfig::default())
        .with_retry(RetryPolicy::none())
}

pub fn collaborators(
    renderer: Arc<MockRenderer>,
    fetcher: Arc<MockFetcher>,
    translator: impl Translator + 'static,
) -> Collaborators {
    Collaborators::new(renderer, fetcher, service(translator))
}
