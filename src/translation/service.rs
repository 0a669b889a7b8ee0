//! 翻译服务
//!
//! `TranslationService` 把一个 [`Translator`] 包装成正文改写阶段使用的服务：
//!
//! 1. 拆出首尾空白，只翻译核心文本
//! 2. 术语表预替换
//! 3. 不含拉丁字母的文本不调用后端
//! 4. 超长文本按句子切分后逐句翻译
//! 5. LRU 缓存，相同文本只请求一次
//! 6. 可重试错误按指数退避重试，次数有上限
//! 7. 合并译文中汉字之间的空白
//!
//! 服务可以被多个工作线程同时调用。

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lru::LruCache;

use super::backend::{DeeplxTranslator, IdentityTranslator, Translator};
use super::config::TranslationConfig;
use super::error::{TranslationError, TranslationResult};
use super::filters::{collapse_cjk_spacing, contains_latin, split_padding, split_sentences};
use super::glossary::Glossary;
use crate::network::retry::RetryPolicy;
use crate::utils::workers::WorkerPool;

/// 服务统计
#[derive(Debug, Default)]
pub struct ServiceStats {
    pub requests: AtomicUsize,
    pub cache_hits: AtomicUsize,
    pub failures: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub requests: usize,
    pub cache_hits: usize,
    pub failures: usize,
}

impl ServiceStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

pub struct TranslationService {
    translator: Box<dyn Translator>,
    config: TranslationConfig,
    glossary: Glossary,
    cache: Mutex<LruCache<String, String>>,
    retry: RetryPolicy,
    pool: WorkerPool,
    stats: ServiceStats,
}

impl TranslationService {
    pub fn new(translator: Box<dyn Translator>, config: TranslationConfig) -> Self {
        let capacity = NonZeroUsize::new(config.local_cache_size).unwrap_or(NonZeroUsize::MIN);
        let retry = RetryPolicy::default().with_attempts(config.max_retry_attempts as u32);
        let pool = WorkerPool::new(config.max_concurrent_requests);

        Self {
            translator,
            config,
            glossary: Glossary::default(),
            cache: Mutex::new(LruCache::new(capacity)),
            retry,
            pool,
            stats: ServiceStats::default(),
        }
    }

    /// 按配置创建：启用时连接 DeepLX，并加载配置中的术语表
    pub fn from_config(config: TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;

        let translator: Box<dyn Translator> = if config.enabled {
            Box::new(DeeplxTranslator::new(&config.api_url, config.request_timeout())?)
        } else {
            Box::new(IdentityTranslator)
        };

        let glossary = match config.glossary_path() {
            Some(path) => Glossary::load(&path)?,
            None => Glossary::default(),
        };

        tracing::info!(
            "翻译服务: 后端 {}，{} → {}",
            translator.name(),
            config.source_lang,
            config.target_lang
        );

        Ok(Self::new(translator, config).with_glossary(glossary))
    }

    /// 只做术语替换和空白整理，不调用任何后端
    pub fn identity() -> Self {
        Self::new(Box::new(IdentityTranslator), TranslationConfig::default())
    }

    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    /// 翻译一段文本，保留首尾空白
    ///
    /// 空白文本原样返回。失败时返回错误，由调用方决定保留原文。
    pub fn translate_text(&self, text: &str) -> TranslationResult<String> {
        let (leading, core, trailing) = split_padding(text);
        if core.is_empty() {
            return Ok(text.to_string());
        }

        let prepared = self.glossary.apply(core);
        let translated = self.translate_prepared(&prepared)?;
        let translated = collapse_cjk_spacing(translated.trim());

        if translated.is_empty() {
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
            return Err(TranslationError::EmptyResult);
        }

        Ok(format!("{leading}{translated}{trailing}"))
    }

    fn translate_prepared(&self, text: &str) -> TranslationResult<String> {
        if !contains_latin(text) {
            return Ok(text.to_string());
        }

        if text.chars().count() <= self.config.max_text_length {
            return self.translate_piece(text);
        }

        tracing::debug!("超长文本 ({} 字符)，按句子切分翻译", text.chars().count());
        let mut result = String::with_capacity(text.len());
        for sentence in split_sentences(text) {
            if sentence.trim().is_empty() || !contains_latin(sentence) {
                result.push_str(sentence);
                continue;
            }
            let (leading, core, trailing) = split_padding(sentence);
            result.push_str(leading);
            result.push_str(&self.translate_piece(core)?);
            result.push_str(trailing);
        }
        Ok(result)
    }

    fn translate_piece(&self, text: &str) -> TranslationResult<String> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(text) {
                self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit.clone());
            }
        }

        let result = self.retry.run(
            "翻译请求",
            |_| {
                self.stats.requests.fetch_add(1, Ordering::Relaxed);
                self.translator
                    .translate(text, &self.config.source_lang, &self.config.target_lang)
            },
            TranslationError::is_retryable,
        );

        match result {
            Ok(translated) if !translated.trim().is_empty() => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.put(text.to_string(), translated.clone());
                }
                Ok(translated)
            }
            Ok(_) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                Err(TranslationError::EmptyResult)
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }
}
