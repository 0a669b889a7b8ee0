use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
pub use url::Url;

/// 以 `from` 为基准解析 `to`，`to` 本身是绝对 URL 时直接使用
pub fn resolve_url(from: &Url, to: &str) -> Option<Url> {
    let to = to.trim();
    if to.is_empty() {
        return None;
    }
    match Url::parse(to) {
        Ok(parsed) => Some(parsed),
        Err(_) => from.join(to).ok(),
    }
}

/// 去掉片段和空查询串
pub fn clean_url(url: Url) -> Url {
    let mut url = url;

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    url
}

/// 只有这些协议的资源可以被抓取并保存到本地
pub fn is_fetchable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https" | "file")
}

/// 把图片 URL 的路径部分映射为资源目录下的相对路径
///
/// `https://site/x/y.png` 在资源目录 `images` 下对应 `images/x/y.png`。
/// 路径段先做百分号解码，`.`、`..` 和空段被丢弃，段内的路径分隔符替换为 `_`，
/// 结果永远不会逃出资源目录。URL 没有任何有效路径段时返回 `None`。
pub fn local_asset_path(url: &Url, asset_dir: &Path) -> Option<PathBuf> {
    let segments: Vec<String> = url
        .path_segments()?
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8_lossy()
                .replace(['/', '\\'], "_")
        })
        .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
        .collect();

    if segments.is_empty() {
        return None;
    }

    let mut path = asset_dir.to_path_buf();
    path.extend(segments);
    Some(path)
}

/// 把本地路径转换为 HTML 中使用的引用（始终使用 `/` 分隔）
pub fn path_to_href(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
