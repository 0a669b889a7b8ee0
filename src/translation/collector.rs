//! 文本收集器模块
//!
//! 按文档顺序收集正文区域内需要翻译的文本单元：文本节点，以及 `title`/`alt` 属性。

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::dom::{get_node_attr, get_node_name, has_class};
use crate::parsers::html::utils::{is_excluded_text_parent, TRANSLATABLE_ATTRS};
use crate::translation::config::constants;

/// 文本单元的位置
#[derive(Debug, Clone)]
pub enum UnitTarget {
    /// 文本节点
    Text(Handle),
    /// 元素属性
    Attribute { element: Handle, name: &'static str },
}

/// 需要翻译的文本及其位置
#[derive(Debug, Clone)]
pub struct TextUnit {
    pub text: String,
    pub target: UnitTarget,
}

impl TextUnit {
    pub fn is_attribute(&self) -> bool {
        matches!(self.target, UnitTarget::Attribute { .. })
    }
}

/// 文本收集器配置
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 父元素带有这些 class 的文本节点不翻译（例如快捷键提示）
    pub skip_classes: Vec<String>,
    /// 是否收集 `title`/`alt` 属性
    pub collect_attributes: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            skip_classes: constants::DEFAULT_SKIP_CLASSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            collect_attributes: true,
        }
    }
}

/// DOM文本收集器
#[derive(Debug, Clone, Default)]
pub struct TextCollector {
    config: CollectorConfig,
}

impl TextCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// 收集 `root` 的后代中的文本单元（不含 `root` 自身的属性）
    pub fn collect(&self, root: &Handle) -> Vec<TextUnit> {
        let mut units = Vec::new();
        for child in root.children.borrow().iter() {
            self.collect_node(child, root, &mut units);
        }
        units
    }

    fn collect_node(&self, node: &Handle, parent: &Handle, units: &mut Vec<TextUnit>) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if text.trim().is_empty() || self.skips_parent(parent) {
                    return;
                }
                units.push(TextUnit {
                    text: text.to_string(),
                    target: UnitTarget::Text(node.clone()),
                });
            }
            NodeData::Element { name, .. } => {
                if is_excluded_text_parent(&name.local) {
                    return;
                }

                if self.config.collect_attributes {
                    for &attr in TRANSLATABLE_ATTRS {
                        if let Some(value) = get_node_attr(node, attr) {
                            if !value.trim().is_empty() {
                                units.push(TextUnit {
                                    text: value,
                                    target: UnitTarget::Attribute {
                                        element: node.clone(),
                                        name: attr,
                                    },
                                });
                            }
                        }
                    }
                }

                for child in node.children.borrow().iter() {
                    self.collect_node(child, node, units);
                }
            }
            _ => {}
        }
    }

    fn skips_parent(&self, parent: &Handle) -> bool {
        get_node_name(parent).is_some()
            && self
                .config
                .skip_classes
                .iter()
                .any(|class| has_class(parent, class))
    }
}
