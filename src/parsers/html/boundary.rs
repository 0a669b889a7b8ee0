//! 正文边界遍历
//!
//! 从锚点之后的第一个兄弟节点开始逐个收集节点，直到停止条件成立。
//! 不同站点在正文末尾追加的渲染残留各不相同，所以停止条件是一个可选的
//! [`BoundaryPolicy`]，遍历逻辑本身不关心具体策略。
//!
//! 收集到的节点不会被移动：每个节点先序列化，拼接后重新解析成一棵新的子树
//! （[`Region`]），原始文档保持不变。

use html5ever::interface::QualName;
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns, parse_fragment, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::anchor::Anchor;
use super::dom::{
    detach_node, find_nodes, get_child_node_by_name, get_node_attr, get_node_name, has_class,
    node_text, serialize_children, serialize_node,
};

/// 默认文本标记（MediaWiki 解析器报告）
pub const DEFAULT_TEXT_MARKER: &str = "NewPP";
/// 默认截断地标
pub const DEFAULT_LANDMARK: &str = "</small>";
/// 默认需要剔除的页面装饰（id 或 class）
pub const DEFAULT_CHROME: &[&str] = &["printfooter", "catlinks"];

/// 元素签名：标签名加可选的属性键值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSignature {
    pub tag: String,
    pub attr: Option<(String, String)>,
}

impl ElementSignature {
    pub fn new(tag: &str, attr: Option<(&str, &str)>) -> Self {
        Self {
            tag: tag.to_string(),
            attr: attr.map(|(name, value)| (name.to_string(), value.to_string())),
        }
    }

    pub fn matches(&self, node: &Handle) -> bool {
        let Some(name) = get_node_name(node) else {
            return false;
        };
        if !name.eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        match &self.attr {
            Some((attr_name, attr_value)) => {
                get_node_attr(node, attr_name).as_deref() == Some(attr_value.as_str())
            }
            None => true,
        }
    }
}

/// 正文结束条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// 节点文本（含注释）包含 `marker` 时停止，触发节点不收集
    TextualMarker { marker: String },
    /// 遇到匹配 `signature` 的兄弟元素时收集它然后停止；
    /// 若给出 `keep` 且其中存在该后代元素，则只收集该后代（去掉外层包裹）
    StructuralMarker {
        signature: ElementSignature,
        keep: Option<String>,
    },
    /// 收集全部兄弟节点，组装阶段再按 `landmark` 做字符串截断
    Unconditional { landmark: String },
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::structural_default()
    }
}

impl BoundaryPolicy {
    pub fn textual_default() -> Self {
        BoundaryPolicy::TextualMarker {
            marker: DEFAULT_TEXT_MARKER.to_string(),
        }
    }

    /// `<div align="right"><small>…</small></div>` 形式的页尾署名
    pub fn structural_default() -> Self {
        BoundaryPolicy::StructuralMarker {
            signature: ElementSignature::new("div", Some(("align", "right"))),
            keep: Some("small".to_string()),
        }
    }

    pub fn unconditional_default() -> Self {
        BoundaryPolicy::Unconditional {
            landmark: DEFAULT_LANDMARK.to_string(),
        }
    }

    /// 组装阶段需要使用的截断地标
    pub fn truncation_landmark(&self) -> Option<&str> {
        match self {
            BoundaryPolicy::Unconditional { landmark } => Some(landmark),
            _ => None,
        }
    }
}

/// 遍历一步的结果
enum Step {
    Take(Handle),
    TakeAndStop(Handle),
    Stop,
}

impl BoundaryPolicy {
    /// 在追加候选节点之前判断
    fn step(&self, candidate: &Handle) -> Step {
        match self {
            BoundaryPolicy::TextualMarker { marker } => {
                if node_text(candidate, true).contains(marker.as_str()) {
                    Step::Stop
                } else {
                    Step::Take(candidate.clone())
                }
            }
            BoundaryPolicy::StructuralMarker { signature, keep } => {
                if !signature.matches(candidate) {
                    return Step::Take(candidate.clone());
                }
                let kept = keep
                    .as_deref()
                    .and_then(|tag| find_nodes(candidate, &[tag]).into_iter().next());
                Step::TakeAndStop(kept.unwrap_or_else(|| candidate.clone()))
            }
            BoundaryPolicy::Unconditional { .. } => Step::Take(candidate.clone()),
        }
    }
}

/// 按策略遍历候选节点，返回被收集的节点（原文档中的节点视图）
pub fn walk_boundary(candidates: Vec<Handle>, policy: &BoundaryPolicy) -> Vec<Handle> {
    let mut walked = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match policy.step(&candidate) {
            Step::Take(node) => walked.push(node),
            Step::TakeAndStop(node) => {
                walked.push(node);
                break;
            }
            Step::Stop => break,
        }
    }

    walked
}

/// 默认解析上下文
pub const DEFAULT_CONTEXT: &str = "body";

/// 表格内部的上下文，以及组装输出时需要补回的外层元素
const TABLE_CONTEXTS: &[(&str, &[&str])] = &[
    ("table", &["table"]),
    ("tbody", &["table", "tbody"]),
    ("thead", &["table", "thead"]),
    ("tfoot", &["table", "tfoot"]),
    ("tr", &["table", "tbody", "tr"]),
    ("colgroup", &["table", "colgroup"]),
];

/// 提取出的正文区域：按原父元素作为上下文解析出的一棵独立 DOM
pub struct Region {
    dom: RcDom,
    root: Handle,
    context: String,
}

impl Region {
    /// 在 `<body>` 上下文中解析 HTML 片段
    pub fn parse(fragment: &str) -> Region {
        Region::parse_in(fragment, DEFAULT_CONTEXT)
    }

    /// 以 `context` 元素为上下文解析片段
    ///
    /// 锚点位于 `<tbody>`、`<tr>` 等表格元素内时，必须在同样的上下文中解析，
    /// 否则行和单元格标签会被丢弃。`meta`、`style` 等元素留在原位，不会被移到 `<head>`。
    pub fn parse_in(fragment: &str, context: &str) -> Region {
        let context = normalize_context(context);
        let dom = parse_fragment(
            RcDom::default(),
            Default::default(),
            QualName::new(None, ns!(html), LocalName::from(context.as_str())),
            Vec::new(),
        )
        .one(fragment);
        let root = get_child_node_by_name(&dom.document, "html")
            .unwrap_or_else(|| dom.document.clone());
        Region { dom, root, context }
    }

    /// 序列化收集到的节点、拼接并在 `context` 中重新解析
    pub fn from_nodes(nodes: &[Handle], context: &str) -> Region {
        let fragment: String = nodes.iter().map(serialize_node).collect();
        Region::parse_in(&fragment, context)
    }

    /// 解析时使用的上下文元素名
    pub fn context(&self) -> &str {
        &self.context
    }

    /// 输出文档中需要包裹在正文外的元素路径（从外到内），普通上下文为空
    pub fn wrapper_path(&self) -> &'static [&'static str] {
        TABLE_CONTEXTS
            .iter()
            .find(|(name, _)| *name == self.context)
            .map(|(_, path)| *path)
            .unwrap_or(&[])
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    /// 区域的顶层节点
    pub fn nodes(&self) -> Vec<Handle> {
        self.root.children.borrow().clone()
    }

    /// 取出顶层节点，区域随之清空
    pub fn take_nodes(&self) -> Vec<Handle> {
        let nodes = std::mem::take(&mut *self.root.children.borrow_mut());
        for node in &nodes {
            node.parent.set(None);
        }
        nodes
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.borrow().is_empty()
    }

    pub fn to_html(&self) -> String {
        serialize_children(&self.root)
    }

    /// 删除 id 或 class 命中列表的元素（页脚、分类栏等页面装饰），返回删除数量
    pub fn strip_chrome(&self, names: &[String]) -> usize {
        if names.is_empty() {
            return 0;
        }
        let mut doomed = Vec::new();
        collect_chrome(&self.root, names, &mut doomed);
        for node in &doomed {
            detach_node(node);
        }
        doomed.len()
    }
}

fn collect_chrome(node: &Handle, names: &[String], doomed: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if let NodeData::Element { .. } = child.data {
            let id = get_node_attr(child, "id");
            let hit = names
                .iter()
                .any(|name| id.as_deref() == Some(name.as_str()) || has_class(child, name));
            if hit {
                doomed.push(child.clone());
                continue;
            }
        }
        collect_chrome(child, names, doomed);
    }
}

/// 文档级元素不能作为片段上下文，退回 `<body>`
fn normalize_context(context: &str) -> String {
    let context = context.trim().to_ascii_lowercase();
    match context.as_str() {
        "" | "html" | "head" | "template" => DEFAULT_CONTEXT.to_string(),
        _ => context,
    }
}

/// 从锚点提取正文区域
pub fn extract_region(anchor: &Anchor, policy: &BoundaryPolicy) -> Region {
    let walked = walk_boundary(anchor.region_candidates(), policy);
    let context = anchor.context_name();
    tracing::debug!("边界遍历收集了 {} 个节点（上下文 <{}>）", walked.len(), context);
    Region::from_nodes(&walked, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::anchor::{locate_anchor, AnchorSpec};
    use crate::parsers::html::dom::html_to_dom;

    fn region_for(html: &str, policy: &BoundaryPolicy) -> String {
        let dom = html_to_dom(html);
        let anchor = locate_anchor(&dom.document, &AnchorSpec::default()).unwrap();
        extract_region(&anchor, policy).to_html()
    }

    #[test]
    fn textual_marker_excludes_trigger_and_rest() {
        let html = "<div><!-- Title --><p>A</p><p>B</p><p>limit NewPP report</p><p>D</p></div>";
        assert_eq!(
            region_for(html, &BoundaryPolicy::textual_default()),
            "<p>A</p><p>B</p>"
        );
    }

    #[test]
    fn textual_marker_matches_comment_siblings() {
        let html = "<div><!-- Title --><p>A</p><!-- NewPP limit report --><p>D</p></div>";
        assert_eq!(region_for(html, &BoundaryPolicy::textual_default()), "<p>A</p>");
    }

    #[test]
    fn structural_marker_keeps_inner_descendant() {
        let html = "<div><!-- Title --><p>A</p><p>B</p>\
                    <div align=\"right\"><small>X</small></div><p>after</p></div>";
        assert_eq!(
            region_for(html, &BoundaryPolicy::structural_default()),
            "<p>A</p><p>B</p><small>X</small>"
        );
    }

    #[test]
    fn structural_marker_without_descendant_keeps_whole_node() {
        let html = "<div><!-- Title --><p>A</p><div align=\"right\">X</div><p>after</p></div>";
        assert_eq!(
            region_for(html, &BoundaryPolicy::structural_default()),
            "<p>A</p><div align=\"right\">X</div>"
        );
    }

    #[test]
    fn unconditional_takes_every_sibling() {
        let html = "<div><!-- Title --><p>A</p>text<!-- c --><p>B</p></div>";
        assert_eq!(
            region_for(html, &BoundaryPolicy::unconditional_default()),
            "<p>A</p>text<!-- c --><p>B</p>"
        );
    }

    #[test]
    fn anchor_as_last_sibling_yields_empty_region() {
        let dom = html_to_dom("<div><p>A</p><!-- Title --></div>");
        let anchor = locate_anchor(&dom.document, &AnchorSpec::default()).unwrap();
        let region = extract_region(&anchor, &BoundaryPolicy::default());
        assert!(region.is_empty());
        assert_eq!(region.to_html(), "");
    }

    #[test]
    fn extraction_leaves_source_untouched() {
        let html = "<div id=\"c\"><!-- Title --><p>A</p><div align=\"right\"><small>X</small></div></div>";
        let dom = html_to_dom(html);
        let anchor = locate_anchor(&dom.document, &AnchorSpec::default()).unwrap();
        let region = extract_region(&anchor, &BoundaryPolicy::default());
        region.take_nodes();
        let container = find_nodes(&dom.document, &["div"]).remove(0);
        assert_eq!(container.children.borrow().len(), 3);
    }

    #[test]
    fn region_keeps_head_only_elements_in_body() {
        let region = Region::parse("<style>p{}</style><p>x</p>");
        assert_eq!(region.nodes().len(), 2);
        assert_eq!(region.to_html(), "<style>p{}</style><p>x</p>");
    }

    #[test]
    fn table_anchor_keeps_rows_and_cells() {
        let html = "<table><tbody><!-- Title --><tr><td>Cell <b>A</b></td></tr>\
                    <tr><td>B</td></tr></tbody></table>";
        let dom = html_to_dom(html);
        let anchor = locate_anchor(&dom.document, &AnchorSpec::default()).unwrap();
        let region = extract_region(&anchor, &BoundaryPolicy::unconditional_default());
        assert_eq!(region.context(), "tbody");
        assert_eq!(region.wrapper_path(), &["table", "tbody"]);
        assert_eq!(
            region.to_html(),
            "<tr><td>Cell <b>A</b></td></tr><tr><td>B</td></tr>"
        );
    }

    #[test]
    fn document_level_context_falls_back_to_body() {
        let region = Region::parse_in("<p>x</p>", "html");
        assert_eq!(region.context(), "body");
        assert!(region.wrapper_path().is_empty());
        assert_eq!(region.to_html(), "<p>x</p>");
    }

    #[test]
    fn strip_chrome_by_id_and_class() {
        let region = Region::parse(
            "<p>keep</p><div class=\"printfooter\">x</div><div><div id=\"catlinks\">y</div></div>",
        );
        let removed = region.strip_chrome(&["printfooter".to_string(), "catlinks".to_string()]);
        assert_eq!(removed, 2);
        assert_eq!(region.to_html(), "<p>keep</p><div></div>");
    }

    #[test]
    fn signature_requires_attribute_value() {
        let dom = html_to_dom("<div align=\"left\"></div><div align=\"right\"></div>");
        let divs = find_nodes(&dom.document, &["div"]);
        let signature = ElementSignature::new("div", Some(("align", "right")));
        assert!(!signature.matches(&divs[0]));
        assert!(signature.matches(&divs[1]));
    }
}
