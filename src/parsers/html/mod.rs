//! HTML解析和处理模块
//!
//! - `utils`: 基础常量（不参与翻译的标签、可翻译属性）
//! - `parser`: srcset 解析
//! - `dom`: 基础DOM操作
//! - `anchor`: 正文起点定位
//! - `boundary`: 正文边界遍历和区域提取
//! - `metadata`: 文档元数据处理
//! - `serializer`: 序列化功能
//! - `assets`: 图片资源本地化
//! - `links`: 正文链接改写

pub mod anchor;
pub mod assets;
pub mod boundary;
pub mod dom;
pub mod links;
pub mod metadata;
pub mod parser;
pub mod serializer;
pub mod utils;

// 重新导出主要的公共 API
pub use anchor::{locate_anchor, Anchor, AnchorSpec};
pub use assets::{localize_images, AssetOptions, AssetReport};
pub use boundary::{extract_region, walk_boundary, BoundaryPolicy, ElementSignature, Region};
pub use dom::{
    find_nodes, get_child_node_by_name, get_node_attr, get_node_name, get_parent_node, html_to_dom,
    set_node_attr,
};
pub use links::{rewrite_links, LinkMode};
pub use metadata::{create_metadata_tag, get_charset, get_title, page_title};
pub use parser::{parse_srcset, SrcSetItem};
pub use serializer::serialize_document;
pub use utils::{is_excluded_text_parent, EXCLUDED_TEXT_PARENTS, WHITESPACES};
