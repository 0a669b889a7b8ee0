//! # 构建器模块
//!
//! - `html_builder` - 输出文档组装（骨架、样式、标题、正文、截断、写入）

pub mod html_builder;

pub use html_builder::{
    truncate_at_landmark, AssembledDocument, DocumentAssembler, DocumentStyle, Truncation,
};
