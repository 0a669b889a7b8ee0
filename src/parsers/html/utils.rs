/// 文本节点的父元素属于这些标签时不参与翻译（非正文内容载体）
pub const EXCLUDED_TEXT_PARENTS: &[&str] = &[
    "script", "style", "meta", "link", "noscript", "template",
];

/// 需要一并翻译的属性
pub const TRANSLATABLE_ATTRS: &[&str] = &["title", "alt"];

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 检查标签是否为非正文内容载体
pub fn is_excluded_text_parent(tag: &str) -> bool {
    EXCLUDED_TEXT_PARENTS
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(tag))
}
