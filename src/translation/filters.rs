//! 文本过滤与整理
//!
//! - 判断文本是否值得送去翻译（必须含拉丁字母）
//! - 超长文本按句子切分
//! - 合并译文中汉字之间多余的空白

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

const SENTENCE_PATTERN: &str = r"[^.!?]+[.!?]*\s*";
const CJK_GAP_PATTERN: &str = r"([\x{4e00}-\x{9fa5}])[\s_]+([\x{4e00}-\x{9fa5}])";

fn sentence_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SENTENCE_PATTERN).ok()).as_ref()
}

fn cjk_gap_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CJK_GAP_PATTERN).ok()).as_ref()
}

/// 文本是否包含拉丁字母
pub fn contains_latin(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// 拆出首尾空白：返回 (前导空白, 核心文本, 尾随空白)
pub fn split_padding(text: &str) -> (&str, &str, &str) {
    let core_start = text.len() - text.trim_start().len();
    let core_end = text.trim_end().len();
    if core_start >= core_end {
        return (text, "", "");
    }
    (&text[..core_start], &text[core_start..core_end], &text[core_end..])
}

/// 按句子切分
///
/// 拼接所有片段等于原文，不会丢失句首的标点。
pub fn split_sentences(text: &str) -> Vec<&str> {
    let Some(re) = sentence_regex() else {
        return vec![text];
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            pieces.push(&text[last..m.start()]);
        }
        pieces.push(m.as_str());
        last = m.end();
    }
    if last < text.len() {
        pieces.push(&text[last..]);
    }

    if pieces.is_empty() {
        pieces.push(text);
    }
    pieces
}

/// 删除两个汉字之间的空白和下划线
pub fn collapse_cjk_spacing(text: &str) -> Cow<'_, str> {
    let Some(re) = cjk_gap_regex() else {
        return Cow::Borrowed(text);
    };

    let mut result = Cow::Borrowed(text);
    // 相邻的匹配会共享汉字，一次替换处理不完
    loop {
        let next = match re.replace_all(&result, "$1$2") {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        match next {
            Some(next) => result = Cow::Owned(next),
            None => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_detection() {
        assert!(contains_latin("Hello"));
        assert!(contains_latin("第2 Tier"));
        assert!(!contains_latin("12 345 — ✓"));
        assert!(!contains_latin("水晶"));
    }

    #[test]
    fn padding_is_split_off() {
        assert_eq!(split_padding("  Hello world \n"), ("  ", "Hello world", " \n"));
        assert_eq!(split_padding("x"), ("", "x", ""));
        assert_eq!(split_padding("   "), ("   ", "", ""));
    }

    #[test]
    fn sentences_cover_the_whole_text() {
        let text = "...First one. Second? Third!  tail";
        let pieces = split_sentences(text);
        assert_eq!(pieces.concat(), text);
        assert_eq!(
            pieces,
            vec!["...", "First one. ", "Second? ", "Third!  ", "tail"]
        );
    }

    #[test]
    fn cjk_gaps_are_collapsed() {
        assert_eq!(collapse_cjk_spacing("水 晶 盒_子"), "水晶盒子");
        assert_eq!(collapse_cjk_spacing("水晶 Tier 2"), "水晶 Tier 2");
        assert!(matches!(collapse_cjk_spacing("plain"), Cow::Borrowed(_)));
    }
}
