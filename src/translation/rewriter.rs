//! 正文改写
//!
//! 收集文本单元后，只把字符串交给工作线程翻译（DOM 句柄不能跨线程），
//! 结果按下标写回各自的节点，文档顺序保持不变。翻译失败或为空时保留原文。

use markup5ever_rcdom::NodeData;

use crate::parsers::html::dom::set_node_attr;

use super::collector::{TextCollector, TextUnit, UnitTarget};
use super::service::TranslationService;

/// 改写统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub units: usize,
    pub translated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// 翻译 `root` 下的所有文本单元
pub fn rewrite_region(
    root: &markup5ever_rcdom::Handle,
    service: &TranslationService,
    collector: &TextCollector,
) -> RewriteStats {
    let units = collector.collect(root);
    let texts: Vec<String> = units.iter().map(|unit| unit.text.clone()).collect();

    tracing::info!(
        "开始翻译 {} 个文本单元（{} 个工作线程）",
        texts.len(),
        service.pool().workers()
    );

    let results = service
        .pool()
        .map(&texts, |text| service.translate_text(text));

    let mut stats = RewriteStats {
        units: units.len(),
        ..RewriteStats::default()
    };

    for (unit, result) in units.iter().zip(results) {
        match result {
            Ok(translated) if !translated.trim().is_empty() => {
                if translated == unit.text {
                    stats.unchanged += 1;
                } else {
                    apply_translation(unit, &translated);
                    stats.translated += 1;
                }
            }
            Ok(_) => {
                tracing::warn!("翻译结果为空，保留原文: {:?}", preview(&unit.text));
                stats.failed += 1;
            }
            Err(e) => {
                tracing::warn!("翻译失败，保留原文 {:?}: {}", preview(&unit.text), e);
                stats.failed += 1;
            }
        }
    }

    tracing::info!(
        "翻译完成: {} 个已翻译，{} 个未变化，{} 个失败",
        stats.translated,
        stats.unchanged,
        stats.failed
    );

    stats
}

/// 把译文写回节点
fn apply_translation(unit: &TextUnit, translated: &str) {
    match &unit.target {
        UnitTarget::Text(node) => {
            if let NodeData::Text { ref contents } = node.data {
                let mut content_ref = contents.borrow_mut();
                content_ref.clear();
                content_ref.push_slice(translated);
            }
        }
        UnitTarget::Attribute { element, name } => {
            set_node_attr(element, name, Some(translated.to_string()));
        }
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(40) {
        Some((index, _)) => format!("{}…", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}
