use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// 按给定编码把字节解码为字符串；编码未知时按 UTF-8 宽松解码
pub fn decode_markup(data: &[u8], document_encoding: &str) -> String {
    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.into_owned()
    } else {
        String::from_utf8_lossy(data).into_owned()
    }
}

/// 将 HTML 字符串解析为 DOM
pub fn html_to_dom(markup: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(markup)
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    let matches = get_node_name(node) == Some(*node_name);

    if matches && rest.is_empty() {
        found_nodes.push(node.clone());
    } else if matches {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, rest));
        }
        return found_nodes;
    }

    for child_node in node.children.borrow().iter() {
        found_nodes.append(&mut find_nodes(child_node, node_names));
    }

    found_nodes
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    children
        .iter()
        .find(|child| get_node_name(child) == Some(node_name))
        .cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 检查元素的 class 列表是否包含指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|value| value.split_whitespace().any(|class| class == class_name))
        .unwrap_or(false)
}

/// 获取父节点
///
/// `parent` 是 `Cell<Option<Weak>>`，读取时必须取出再放回，否则会切断反向引用。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 获取节点之后的所有兄弟节点（按文档顺序）
pub fn following_siblings(node: &Handle) -> Vec<Handle> {
    let Some(parent) = get_parent_node(node) else {
        return Vec::new();
    };
    let children = parent.children.borrow();
    match children.iter().position(|child| Rc::ptr_eq(child, node)) {
        Some(index) => children[index + 1..].to_vec(),
        None => Vec::new(),
    }
}

/// 把节点挂到新父节点的子节点末尾
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 从父节点中移除节点
pub fn detach_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// 收集节点及其后代中的文本
///
/// `include_comments` 为真时注释内容也计入，用于查找隐藏在注释里的标记。
pub fn node_text(node: &Handle, include_comments: bool) -> String {
    let mut text = String::new();
    collect_text(node, include_comments, &mut text);
    text
}

fn collect_text(node: &Handle, include_comments: bool, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Comment { contents } if include_comments => out.push_str(contents),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, include_comments, out);
            }
        }
    }
}

/// 序列化单个节点（包含节点本身）
pub fn serialize_node(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    // 写入 Vec 不会产生 I/O 错误；失败时返回空串
    if serialize(&mut buf, &SerializableHandle::from(node.clone()), opts).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// 序列化节点的全部子节点
pub fn serialize_children(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    if serialize(
        &mut buf,
        &SerializableHandle::from(node.clone()),
        SerializeOpts::default(),
    )
    .is_err()
    {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::{namespace_url, ns, LocalName};

    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            // Add new attribute (since originally the target node didn't have it)
            if let Some(attr_value) = attr_value {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}
