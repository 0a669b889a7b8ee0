//! # 解析器模块
//!
//! 这个模块包含处理渲染后维基页面的全部 DOM 逻辑：
//!
//! - 定位正文起点、按边界策略提取正文区域
//! - 图片资源本地化和链接改写
//! - 元数据读取与文档序列化
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM操作、正文提取、资源处理

pub mod html;

// Re-export commonly used items for convenience
pub use html::{
    create_metadata_tag, extract_region, get_charset, get_title, html_to_dom, locate_anchor,
    serialize_document, Anchor, AnchorSpec, BoundaryPolicy, Region,
};
