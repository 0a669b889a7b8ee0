//! 正文起点定位
//!
//! 渲染后的维基页面里，正文开始的位置由一个结构锚点标记：
//!
//! - 哨兵注释：文本中包含固定子串的注释节点（例如 `<!-- Title -->`），正文是它之后的兄弟节点；
//! - 命名容器：例如 `#mw-content-text .mw-parser-output`，正文是容器的子节点。
//!
//! 定位过程只读，不修改文档。

use std::fmt;

use markup5ever_rcdom::{Handle, NodeData};

use super::boundary::DEFAULT_CONTEXT;
use super::dom::{following_siblings, get_node_attr, get_node_name, get_parent_node, has_class};

/// 默认哨兵子串
pub const DEFAULT_SENTINEL: &str = "Title";

/// 默认容器（MediaWiki 的正文输出容器）
pub const DEFAULT_CONTAINER_ID: &str = "mw-content-text";
pub const DEFAULT_CONTAINER_CLASS: &str = "mw-parser-output";

/// 锚点的查找方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorSpec {
    /// 文本包含 `sentinel` 的注释节点（区分大小写的子串匹配）
    Comment { sentinel: String },
    /// `id` 匹配的元素内、`class` 匹配的第一个元素（两者至少给出一个）
    Container {
        id: Option<String>,
        class: Option<String>,
    },
}

impl Default for AnchorSpec {
    fn default() -> Self {
        AnchorSpec::Comment {
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl AnchorSpec {
    /// MediaWiki 默认正文容器
    pub fn mediawiki_container() -> Self {
        AnchorSpec::Container {
            id: Some(DEFAULT_CONTAINER_ID.to_string()),
            class: Some(DEFAULT_CONTAINER_CLASS.to_string()),
        }
    }
}

impl fmt::Display for AnchorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSpec::Comment { sentinel } => write!(f, "comment containing \"{sentinel}\""),
            AnchorSpec::Container { id, class } => {
                let id = id.as_deref().map(|id| format!("#{id}")).unwrap_or_default();
                let class = class
                    .as_deref()
                    .map(|class| format!(" .{class}"))
                    .unwrap_or_default();
                write!(f, "container \"{}\"", format!("{id}{class}").trim())
            }
        }
    }
}

/// 找到的锚点
#[derive(Debug, Clone)]
pub enum Anchor {
    Comment(Handle),
    Container(Handle),
}

impl Anchor {
    pub fn node(&self) -> &Handle {
        match self {
            Anchor::Comment(node) | Anchor::Container(node) => node,
        }
    }

    /// 正文候选节点：注释之后的兄弟节点，或容器的子节点
    pub fn region_candidates(&self) -> Vec<Handle> {
        match self {
            Anchor::Comment(node) => following_siblings(node),
            Anchor::Container(node) => node.children.borrow().clone(),
        }
    }

    /// 候选节点所在的父元素名，重新解析正文时作为上下文
    pub fn context_name(&self) -> String {
        let parent = match self {
            Anchor::Comment(node) => get_parent_node(node),
            Anchor::Container(node) => Some(node.clone()),
        };
        parent
            .as_ref()
            .and_then(get_node_name)
            .unwrap_or(DEFAULT_CONTEXT)
            .to_string()
    }
}

/// 在文档中按深度优先顺序查找第一个锚点
pub fn locate_anchor(document: &Handle, spec: &AnchorSpec) -> Option<Anchor> {
    match spec {
        AnchorSpec::Comment { sentinel } => find_comment(document, sentinel).map(Anchor::Comment),
        AnchorSpec::Container { id, class } => {
            find_container(document, id.as_deref(), class.as_deref()).map(Anchor::Container)
        }
    }
}

/// 查找文本包含 `sentinel` 的第一个注释节点
pub fn find_comment(node: &Handle, sentinel: &str) -> Option<Handle> {
    if let NodeData::Comment { ref contents } = node.data {
        if contents.contains(sentinel) {
            return Some(node.clone());
        }
    }

    // 模板内容不属于渲染后的文档树
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_comment(child, sentinel))
}

fn find_container(node: &Handle, id: Option<&str>, class: Option<&str>) -> Option<Handle> {
    match (id, class) {
        (None, None) => None,
        (Some(id), class) => {
            let scope = find_element(node, &|n| get_node_attr(n, "id").as_deref() == Some(id))?;
            match class {
                Some(class) => find_element(&scope, &|n| has_class(n, class)),
                None => Some(scope),
            }
        }
        (None, Some(class)) => find_element(node, &|n| has_class(n, class)),
    }
}

fn find_element(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    if get_node_name(node).is_some() && predicate(node) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, predicate))
}
