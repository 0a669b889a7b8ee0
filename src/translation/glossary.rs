//! 术语表
//!
//! 在送去翻译之前，先把固定术语直接替换为约定译名，保证专有名词译法一致。
//! 术语表是一个 JSON 对象 `{ "术语": "译名" }`；每个术语自动补上英文复数形式，
//! 匹配时整词、不区分大小写，长术语优先。

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use regex::{Captures, Regex, RegexBuilder};

use super::error::{TranslationError, TranslationResult};

#[derive(Debug, Default)]
pub struct Glossary {
    lookup: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl Glossary {
    pub fn new(entries: HashMap<String, String>) -> TranslationResult<Self> {
        let mut lookup: HashMap<String, String> = HashMap::new();
        for (term, replacement) in &entries {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            lookup.insert(term.to_lowercase(), replacement.clone());
        }

        // 复数形式不覆盖已有词条
        for (term, replacement) in &entries {
            let plural = pluralize(term.trim());
            if !plural.is_empty() {
                lookup
                    .entry(plural.to_lowercase())
                    .or_insert_with(|| replacement.clone());
            }
        }

        if lookup.is_empty() {
            return Ok(Self::default());
        }

        let mut terms: Vec<&String> = lookup.keys().collect();
        // 交替分支按顺序尝试，长词在前
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let alternation = terms
            .iter()
            .map(|term| regex::escape(term))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
            .case_insensitive(true)
            .size_limit(64 * (1 << 20))
            .build()
            .map_err(|e| TranslationError::GlossaryError(e.to_string()))?;

        Ok(Self {
            lookup,
            pattern: Some(pattern),
        })
    }

    pub fn from_json(json: &str) -> TranslationResult<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| TranslationError::GlossaryError(format!("解析术语表失败: {}", e)))?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> TranslationResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::GlossaryError(format!("读取术语表 {} 失败: {}", path.display(), e))
        })?;
        let glossary = Self::from_json(&json)?;
        tracing::info!("术语表加载完成，共 {} 个词条（含复数）", glossary.len());
        Ok(glossary)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// 替换文本中的术语
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, |caps: &Captures| {
                self.lookup
                    .get(&caps[0].to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            }),
            None => Cow::Borrowed(text),
        }
    }
}

/// 英文名词的简单复数形式
fn pluralize(term: &str) -> String {
    let Some(last) = term.chars().last() else {
        return String::new();
    };
    if !last.is_ascii_alphabetic() {
        return String::new();
    }

    let lower = term.to_lowercase();
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        format!("{term}es")
    } else if lower.ends_with('y')
        && !lower
            .chars()
            .rev()
            .nth(1)
            .map_or(false, |c| "aeiou".contains(c))
    {
        format!("{}ies", &term[..term.len() - 1])
    } else {
        format!("{term}s")
    }
}
