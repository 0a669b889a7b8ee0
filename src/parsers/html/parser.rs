//! srcset 属性解析
//!
//! 响应式图片的 `srcset` 由逗号分隔的候选项组成，每项是 URL 加可选描述符
//! （宽度 `480w` 或像素密度 `2x`）。

use super::utils::WHITESPACES;

/// SrcSet 属性项目结构
#[derive(Debug, PartialEq, Eq)]
pub struct SrcSetItem<'a> {
    /// 图片文件的路径或URL
    pub path: &'a str,
    /// 图片描述符，没有时为空字符串
    pub descriptor: &'a str,
}

/// 解析HTML图片的srcset属性
///
/// ```rust
/// # use wikitrans::parsers::html::parser::parse_srcset;
/// let items = parse_srcset("small.jpg 480w, large.jpg 800w");
/// assert_eq!(items.len(), 2);
/// assert_eq!(items[1].path, "large.jpg");
/// assert_eq!(items[1].descriptor, "800w");
/// ```
pub fn parse_srcset(srcset: &str) -> Vec<SrcSetItem<'_>> {
    srcset
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate
                .split(WHITESPACES)
                .filter(|part| !part.is_empty());
            let path = parts.next()?;
            Some(SrcSetItem {
                path,
                descriptor: parts.next().unwrap_or_default(),
            })
        })
        .collect()
}

/// 把解析后的候选项重新拼成 srcset 字符串
pub fn format_srcset(items: &[(String, String)]) -> String {
    items
        .iter()
        .map(|(path, descriptor)| {
            if descriptor.is_empty() {
                path.clone()
            } else {
                format!("{path} {descriptor}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
