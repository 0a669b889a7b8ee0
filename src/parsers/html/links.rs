//! 正文链接改写
//!
//! 提取出的正文保存为本地文件后，原来的相对链接会失效。两种处理方式：
//!
//! - [`LinkMode::Absolute`]：所有相对链接改为指向原站的绝对地址；
//! - [`LinkMode::LocalPages`]：同站点的普通条目链接改为 `./<页面名>.html`，
//!   便于批量保存的页面互相跳转，其他链接仍改为绝对地址。

use markup5ever_rcdom::Handle;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::utils::url::resolve_url;

use super::dom::{find_nodes, get_node_attr, set_node_attr};

/// 不作为普通条目处理的 MediaWiki 命名空间
pub const BLOCKED_NAMESPACES: &[&str] = &[
    "Special",
    "File",
    "User",
    "MediaWiki",
    "Template",
    "Help",
    "Category",
];

const STATIC_EXTENSIONS: &[&str] = &[
    "css", "js", "png", "jpg", "jpeg", "gif", "svg", "ico", "php",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkMode {
    #[default]
    Absolute,
    LocalPages,
}

/// 从链接中取出同站点条目的页面名；不是普通条目时返回 `None`
pub fn wiki_page_name(href: &str, base_url: &Url) -> Option<String> {
    let url = resolve_url(base_url, href)?;
    if url.host_str() != base_url.host_str() || !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let path = percent_decode_str(url.path()).decode_utf8_lossy();
    if path.starts_with("/w/index.php") {
        return None;
    }

    let page = path.trim_start_matches('/');
    let page = page.strip_prefix("wiki/").unwrap_or(page);
    if page.is_empty() || page.contains('#') {
        return None;
    }

    if let Some((namespace, _)) = page.split_once(':') {
        if BLOCKED_NAMESPACES
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(namespace))
        {
            return None;
        }
    }

    if let Some((_, extension)) = page.rsplit_once('.') {
        if STATIC_EXTENSIONS
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
        {
            return None;
        }
    }

    Some(page.replace('/', "_"))
}

/// 改写区域内所有 `<a href>`，返回被改写的链接数量
pub fn rewrite_links(root: &Handle, base_url: &Url, mode: LinkMode) -> usize {
    let mut rewritten = 0;

    for anchor in find_nodes(root, &["a"]) {
        let Some(href) = get_node_attr(&anchor, "href") else {
            continue;
        };
        let href = href.trim();
        // 页内跳转和脚本链接保持原样
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            continue;
        }

        let target = match mode {
            LinkMode::LocalPages => wiki_page_name(href, base_url)
                .map(|page| format!("./{page}.html"))
                .or_else(|| absolute_href(href, base_url)),
            LinkMode::Absolute => absolute_href(href, base_url),
        };

        if let Some(target) = target {
            if target != href {
                set_node_attr(&anchor, "href", Some(target));
                rewritten += 1;
            }
        }
    }

    tracing::debug!("改写了 {} 个链接", rewritten);
    rewritten
}

fn absolute_href(href: &str, base_url: &Url) -> Option<String> {
    if Url::parse(href).is_ok() {
        return None;
    }
    resolve_url(base_url, href).map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::boundary::Region;

    fn base() -> Url {
        Url::parse("https://en.tankiwiki.com/Crystals").unwrap()
    }

    #[test]
    fn page_names_skip_namespaces_and_files() {
        let base = base();
        assert_eq!(wiki_page_name("/Gold_Boxes", &base).as_deref(), Some("Gold_Boxes"));
        assert_eq!(wiki_page_name("/wiki/Main_Page", &base).as_deref(), Some("Main_Page"));
        assert_eq!(wiki_page_name("/Special:Search", &base), None);
        assert_eq!(wiki_page_name("/category:Tanks", &base), None);
        assert_eq!(wiki_page_name("/images/a.png", &base), None);
        assert_eq!(wiki_page_name("/w/index.php?title=X", &base), None);
        assert_eq!(wiki_page_name("https://other.example/Page", &base), None);
    }

    #[test]
    fn absolute_mode_resolves_relative_links() {
        let region = Region::parse(
            "<a href=\"/Gold_Boxes\">g</a><a href=\"#top\">t</a><a href=\"https://x.example/\">x</a>",
        );
        let count = rewrite_links(region.root(), &base(), LinkMode::Absolute);
        assert_eq!(count, 1);
        assert_eq!(
            region.to_html(),
            "<a href=\"https://en.tankiwiki.com/Gold_Boxes\">g</a><a href=\"#top\">t</a><a href=\"https://x.example/\">x</a>"
        );
    }

    #[test]
    fn local_pages_mode_links_articles_locally() {
        let region = Region::parse("<a href=\"/Gold_Boxes#Drops\">g</a><a href=\"/File:A.png\">f</a>");
        rewrite_links(region.root(), &base(), LinkMode::LocalPages);
        assert_eq!(
            region.to_html(),
            "<a href=\"./Gold_Boxes.html\">g</a><a href=\"https://en.tankiwiki.com/File:A.png\">f</a>"
        );
    }
}
