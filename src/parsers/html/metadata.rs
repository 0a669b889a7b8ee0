//! HTML 文档元数据处理模块
//!
//! 此模块负责从渲染后的页面中读取元数据：
//! - 字符编码声明
//! - 文档标题（`<title>`、`#firstHeading` 或 URL 最后一段）
//! - 生成输出文档的来源注释

use chrono::{SecondsFormat, Utc};
use markup5ever_rcdom::{Handle, NodeData};
use percent_encoding::percent_decode_str;

use crate::network::session::parse_content_type;
use crate::utils::url::{clean_url, Url};

use super::dom::{find_nodes, get_node_attr, get_node_name, node_text};

/// 获取文档字符编码
///
/// 支持两种格式：
/// 1. HTML5 格式：`<meta charset="utf-8">`
/// 2. HTML4 格式：`<meta http-equiv="content-type" content="text/html; charset=utf-8">`
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, &["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            return Some(meta_charset_node_attr_value);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(meta_content_type_node_attr_value) = get_node_attr(meta_node, "content") {
                let (_media_type, charset, _is_base64) =
                    parse_content_type(&meta_content_type_node_attr_value);
                return Some(charset);
            }
        }
    }

    None
}

/// 获取文档标题
///
/// 只返回第一个 `<title>` 的文本内容；空白标题视为没有标题。
pub fn get_title(node: &Handle) -> Option<String> {
    for title_node in find_nodes(node, &["html", "head", "title"]).iter() {
        for child_node in title_node.children.borrow().iter() {
            if let NodeData::Text { ref contents } = child_node.data {
                let title = contents.borrow().trim().to_string();
                if !title.is_empty() {
                    return Some(title);
                }
            }
        }
    }

    None
}

/// 获取 MediaWiki 的页面主标题 `<h1 id="firstHeading">`
pub fn get_first_heading(node: &Handle) -> Option<String> {
    if get_node_name(node) == Some("h1")
        && get_node_attr(node, "id").as_deref() == Some("firstHeading")
    {
        let text = node_text(node, false).trim().to_string();
        return (!text.is_empty()).then_some(text);
    }

    node.children.borrow().iter().find_map(get_first_heading)
}

/// 去掉站点名后缀，例如 `"Crystals - Tanki Online Wiki"` → `"Crystals"`
pub fn strip_title_suffix(title: &str, suffix: Option<&str>) -> String {
    let title = title.trim();
    match suffix.map(str::trim).filter(|s| !s.is_empty()) {
        Some(suffix) => title
            .strip_suffix(suffix)
            .map(|rest| rest.trim_end_matches([' ', '-', '|', '–']).trim_end())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(title)
            .to_string(),
        None => title.to_string(),
    }
}

/// 确定页面标题：`<title>` → `#firstHeading` → URL 最后一段
pub fn page_title(document: &Handle, url: &Url, suffix: Option<&str>) -> String {
    if let Some(title) = get_title(document).or_else(|| get_first_heading(document)) {
        return strip_title_suffix(&title, suffix);
    }

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8_lossy()
                .replace('_', " ")
        })
        .unwrap_or_else(|| url.host_str().unwrap_or_default().to_string())
}

/// 生成输出文档开头的来源注释
pub fn create_metadata_tag(url: &Url) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut clean_url: Url = clean_url(url.clone());

    // 防止凭据信息泄露到元数据中
    let is_http = clean_url.scheme() == "http" || clean_url.scheme() == "https";
    if is_http {
        let _ = clean_url.set_username("");
        let _ = clean_url.set_password(None);
    }

    format!(
        "<!-- Translated from {} at {} using {} v{} -->",
        if is_http {
            clean_url.as_str()
        } else {
            "local source"
        },
        datetime,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}
