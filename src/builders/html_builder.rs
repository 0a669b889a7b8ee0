//! 输出文档组装
//!
//! 把翻译后的标题和改写后的正文区域组装成一个完整的 HTML 文档：
//! 固定的编码声明、字体与样式、`<title>`，正文作为 `<body>` 的内容。
//!
//! 文档先解析出骨架 DOM，再把区域的顶层节点移入 `<body>`，最后由 html5ever 序列化，
//! 所以无论区域是否为空、是否被截断，输出的标签总是成对闭合的。

use std::path::Path;

use markup5ever_rcdom::{Handle, RcDom};

use crate::parsers::html::boundary::Region;
use crate::parsers::html::dom::{append_child, find_nodes, html_to_dom};
use crate::parsers::html::serializer::serialize_document;
use crate::utils::fs::write_atomically;

/// 默认字体导入
pub const DEFAULT_FONT_IMPORT: &str =
    "https://fonts.googleapis.com/css2?family=M+PLUS+1p&family=Rubik&display=swap";

/// 默认样式
pub const DEFAULT_CSS: &str = "body{font-family:'Rubik','M PLUS 1p',Arial,sans-serif;\
margin:20px;max-width:900px;line-height:1.6;}h1{color:#333;}img{max-width:100%;height:auto;}";

/// 输出文档的样式配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStyle {
    /// `<html lang>`
    pub lang: String,
    /// 通过 `@import` 引入的字体样式表
    pub font_import: Option<String>,
    pub css: String,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            lang: "zh-CN".to_string(),
            font_import: Some(DEFAULT_FONT_IMPORT.to_string()),
            css: DEFAULT_CSS.to_string(),
        }
    }
}

impl DocumentStyle {
    /// 以目标语言为 `lang` 的默认样式
    pub fn for_lang(lang: &str) -> Self {
        Self {
            lang: html_lang(lang),
            ..Self::default()
        }
    }

    fn style_block(&self) -> String {
        let mut block = String::new();
        if let Some(import) = self.font_import.as_deref().filter(|s| !s.trim().is_empty()) {
            block.push_str(&format!("@import url('{}');", import.replace('\'', "%27")));
        }
        // 样式是原始文本，不能提前结束 <style>
        block.push_str(&self.css.replace("</", "<\\/"));
        block
    }
}

/// 截断结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// 边界策略不需要截断
    NotRequested,
    Applied,
    /// 地标不存在，输出保留了全部内容
    LandmarkNotFound,
}

/// 组装好的文档
pub struct AssembledDocument {
    pub dom: RcDom,
    pub truncation: Truncation,
}

impl AssembledDocument {
    /// 序列化为 UTF-8 字节，`metadata` 插在文档类型声明之后
    pub fn to_bytes(&self, metadata: Option<&str>) -> std::io::Result<Vec<u8>> {
        let mut bytes = serialize_document(&self.dom, "utf-8")?;

        if let Some(comment) = metadata {
            const DOCTYPE: &[u8] = b"<!DOCTYPE html>";
            let position = if bytes.starts_with(DOCTYPE) {
                DOCTYPE.len()
            } else {
                0
            };
            let mut out = Vec::with_capacity(bytes.len() + comment.len() + 2);
            out.extend_from_slice(&bytes[..position]);
            if position > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(comment.as_bytes());
            out.push(b'\n');
            out.extend_from_slice(&bytes[position..]);
            bytes = out;
        }

        Ok(bytes)
    }

    /// 写入目标路径（自动创建父目录，已存在则覆盖）
    pub fn write_to(&self, path: &Path, metadata: Option<&str>) -> std::io::Result<usize> {
        let bytes = self.to_bytes(metadata)?;
        write_atomically(path, &bytes)?;
        Ok(bytes.len())
    }
}

pub struct DocumentAssembler {
    style: DocumentStyle,
}

impl DocumentAssembler {
    pub fn new(style: DocumentStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &DocumentStyle {
        &self.style
    }

    /// 组装文档
    ///
    /// `landmark` 不为空时先在序列化后的正文中查找它，找到则丢弃其后的所有内容。
    /// 区域的节点会被移入新文档，调用后区域为空。
    pub fn assemble(&self, title: &str, region: Region, landmark: Option<&str>) -> AssembledDocument {
        let (region, truncation) = match landmark {
            Some(landmark) => truncate_at_landmark(region, landmark),
            None => (region, Truncation::NotRequested),
        };

        // 表格上下文的正文需要补回外层表格元素
        let wrapper = region.wrapper_path();
        let open: String = wrapper.iter().map(|tag| format!("<{tag}>")).collect();
        let close: String = wrapper.iter().rev().map(|tag| format!("</{tag}>")).collect();

        let dom = html_to_dom(&format!(
            "<!DOCTYPE html><html lang=\"{}\"><head><meta charset=\"UTF-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
             <title>{}</title><style>{}</style></head><body>{open}{close}</body></html>",
            escape_attr(&self.style.lang),
            escape_text(title),
            self.style.style_block(),
        ));

        match content_parent(&dom, wrapper) {
            Some(parent) => {
                for node in region.take_nodes() {
                    append_child(&parent, node);
                }
            }
            None => tracing::warn!("骨架文档缺少 <body>，正文被丢弃"),
        }

        AssembledDocument { dom, truncation }
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new(DocumentStyle::default())
    }
}

/// 按地标截断区域：保留地标本身及其之前的内容，然后重新解析补全闭合标签
pub fn truncate_at_landmark(region: Region, landmark: &str) -> (Region, Truncation) {
    if landmark.is_empty() {
        return (region, Truncation::NotRequested);
    }

    let html = region.to_html();
    match html.find(landmark) {
        Some(index) => {
            let cut = &html[..index + landmark.len()];
            tracing::debug!("在 {} 处截断正文，丢弃 {} 字节", index, html.len() - cut.len());
            (Region::parse_in(cut, region.context()), Truncation::Applied)
        }
        None => {
            tracing::warn!("未找到截断地标 {:?}，保留全部正文", landmark);
            (region, Truncation::LandmarkNotFound)
        }
    }
}

/// 正文节点的挂载点：`<body>`，或其中补回的最内层表格元素
fn content_parent(dom: &RcDom, wrapper: &[&str]) -> Option<Handle> {
    let mut path = vec!["html", "body"];
    path.extend_from_slice(wrapper);
    find_nodes(&dom.document, &path).into_iter().next()
}

/// `zh` → `zh-CN`，其余语言代码原样使用
fn html_lang(lang: &str) -> String {
    match lang.trim().to_lowercase().as_str() {
        "zh" | "zh-cn" | "zh-hans" => "zh-CN".to_string(),
        "zh-tw" | "zh-hant" => "zh-TW".to_string(),
        "" => "und".to_string(),
        other => other.to_string(),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
