//! 处理流程
//!
//! 一次运行处理一个页面、写出一个文件，各阶段严格按顺序执行：
//!
//! 渲染 → 定位锚点 → 边界遍历 → 翻译正文 → 本地化图片 → 组装 → 写入
//!
//! 渲染失败和找不到锚点是致命错误，运行中止且不写任何文件；单条翻译失败、
//! 单张图片失败和截断地标缺失只记为警告，运行结束后汇总。

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use url::Url;

use crate::builders::html_builder::{DocumentAssembler, DocumentStyle, Truncation};
use crate::network::fetcher::Fetcher;
use crate::network::renderer::{RenderError, Renderer};
use crate::network::session::Session;
use crate::parsers::html::anchor::{locate_anchor, AnchorSpec};
use crate::parsers::html::assets::{
    localize_images, AssetOptions, ImageReplacements, DEFAULT_ASSET_DIR,
};
use crate::parsers::html::boundary::{extract_region, BoundaryPolicy, DEFAULT_CHROME};
use crate::parsers::html::dom::html_to_dom;
use crate::parsers::html::links::{rewrite_links, LinkMode};
use crate::parsers::html::metadata::{create_metadata_tag, page_title};
use crate::translation::collector::{CollectorConfig, TextCollector};
use crate::translation::rewriter::rewrite_region;
use crate::translation::service::TranslationService;
use crate::utils::workers::WorkerPool;

/// 图片抓取的默认并发数
pub const DEFAULT_WORKERS: usize = 4;

/// 未指定输出路径时使用的模板
pub const DEFAULT_OUTPUT: &str = "%title%.html";

/// 致命错误：运行中止，不产生输出文件
#[derive(Error, Debug)]
pub enum WikiError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("no content anchor ({spec}) found in {url}")]
    MissingAnchor { spec: String, url: String },

    #[error("invalid URL or path \"{0}\"")]
    InvalidUrl(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run did not finish within {0:?}")]
    Timeout(Duration),
}

/// 可恢复的问题
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningKind {
    TranslationFailure,
    AssetFetchFailure,
    AssemblyTruncationNotFound,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::TranslationFailure => "TranslationFailure",
            WarningKind::AssetFetchFailure => "AssetFetchFailure",
            WarningKind::AssemblyTruncationNotFound => "AssemblyTruncationNotFound",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 运行结果
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub output: PathBuf,
    pub title: String,
    pub bytes_written: usize,
    pub region_nodes: usize,
    pub chrome_removed: usize,
    pub text_units: usize,
    pub translated: usize,
    pub links_rewritten: usize,
    pub images_localized: usize,
    pub images_replaced: usize,
    pub files_written: usize,
    warnings: BTreeMap<WarningKind, usize>,
}

impl RunReport {
    pub fn warn(&mut self, kind: WarningKind) {
        self.warn_n(kind, 1);
    }

    pub fn warn_n(&mut self, kind: WarningKind, count: usize) {
        if count > 0 {
            *self.warnings.entry(kind).or_insert(0) += count;
        }
    }

    pub fn warnings(&self, kind: WarningKind) -> usize {
        self.warnings.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_warnings(&self) -> usize {
        self.warnings.values().sum()
    }

    /// 一行汇总，包含每种警告的数量
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{}: {} 个文本单元中 {} 个已翻译，{} 张图片已本地化",
            self.output.display(),
            self.text_units,
            self.translated,
            self.images_localized
        );
        if !self.warnings.is_empty() {
            let details: Vec<String> = self
                .warnings
                .iter()
                .map(|(kind, count)| format!("{kind} × {count}"))
                .collect();
            summary.push_str(&format!("；警告: {}", details.join(", ")));
        }
        summary
    }
}

/// 一次运行的选项
#[derive(Debug, Clone)]
pub struct WikiOptions {
    pub anchor: AnchorSpec,
    pub boundary: BoundaryPolicy,
    /// 从正文中剔除的装饰元素（id 或 class）
    pub strip_chrome: Vec<String>,
    /// 解析相对地址的基准，默认为页面地址
    pub base_url: Option<Url>,
    pub asset_dir: PathBuf,
    /// 抓取前替换的图片地址
    pub image_replacements: ImageReplacements,
    pub link_mode: LinkMode,
    pub title_suffix: Option<String>,
    pub style: DocumentStyle,
    pub no_metadata: bool,
    /// 图片抓取并发数
    pub workers: usize,
    /// 整个运行的超时时间
    pub deadline: Option<Duration>,
}

impl Default for WikiOptions {
    fn default() -> Self {
        Self {
            anchor: AnchorSpec::default(),
            boundary: BoundaryPolicy::default(),
            strip_chrome: DEFAULT_CHROME.iter().map(|s| s.to_string()).collect(),
            base_url: None,
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            image_replacements: ImageReplacements::default(),
            link_mode: LinkMode::default(),
            title_suffix: None,
            style: DocumentStyle::default(),
            no_metadata: false,
            workers: DEFAULT_WORKERS,
            deadline: None,
        }
    }
}

/// 外部协作者，运行开始时创建，运行结束时释放（无论成功与否）
pub struct Collaborators {
    renderer: Arc<dyn Renderer>,
    fetcher: Arc<dyn Fetcher>,
    translation: TranslationService,
}

impl Collaborators {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        fetcher: Arc<dyn Fetcher>,
        translation: TranslationService,
    ) -> Self {
        Self {
            renderer,
            fetcher,
            translation,
        }
    }

    /// 页面和图片共用同一个 HTTP 会话
    pub fn with_session(session: Session, translation: TranslationService) -> Self {
        let session = Arc::new(session);
        Self::new(session.clone(), session, translation)
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    pub fn translation(&self) -> &TranslationService {
        &self.translation
    }
}

impl Drop for Collaborators {
    fn drop(&mut self) {
        let stats = self.translation.stats();
        tracing::debug!(
            "释放协作者: 翻译请求 {} 次，缓存命中 {} 次",
            stats.requests,
            stats.cache_hits
        );
        self.renderer.shutdown();
    }
}

/// 文档处理器，负责协调整个处理流程
pub struct DocumentProcessor<'a> {
    options: &'a WikiOptions,
    collaborators: &'a Collaborators,
    cancelled: Option<Arc<AtomicBool>>,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(options: &'a WikiOptions, collaborators: &'a Collaborators) -> Self {
        Self {
            options,
            collaborators,
            cancelled: None,
        }
    }

    /// 标志被置位后，流程在下一次写文件之前中止
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    fn check_cancelled(&self) -> Result<(), WikiError> {
        match &self.cancelled {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                tracing::warn!("运行已超时，放弃写入");
                Err(WikiError::Timeout(self.options.deadline.unwrap_or_default()))
            }
            _ => Ok(()),
        }
    }

    /// 处理 `page_url`，写入 `output`（支持 `%title%`、`%timestamp%` 占位符）
    pub fn process(&self, page_url: &Url, output: &str) -> Result<RunReport, WikiError> {
        let mut report = RunReport::default();

        // 1. 渲染
        let markup = self.collaborators.renderer().render(page_url)?;
        let dom = html_to_dom(&markup);
        let base_url = self.options.base_url.clone().unwrap_or_else(|| page_url.clone());

        // 2. 定位锚点，在任何文件操作之前
        let anchor = locate_anchor(&dom.document, &self.options.anchor).ok_or_else(|| {
            WikiError::MissingAnchor {
                spec: self.options.anchor.to_string(),
                url: page_url.to_string(),
            }
        })?;

        let title = page_title(
            &dom.document,
            page_url,
            self.options.title_suffix.as_deref(),
        );
        tracing::info!("页面标题: {}", title);

        // 3. 边界遍历
        let region = extract_region(&anchor, &self.options.boundary);
        drop(anchor);
        drop(dom);
        report.chrome_removed = region.strip_chrome(&self.options.strip_chrome);
        report.region_nodes = region.nodes().len();
        tracing::info!(
            "提取正文: {} 个顶层节点，剔除 {} 个装饰元素",
            report.region_nodes,
            report.chrome_removed
        );

        // 4. 翻译正文与标题
        let translation = self.collaborators.translation();
        let collector = TextCollector::new(CollectorConfig {
            skip_classes: translation.config().skip_classes.clone(),
            ..Default::default()
        });
        let stats = rewrite_region(region.root(), translation, &collector);
        report.text_units = stats.units;
        report.translated = stats.translated;
        report.warn_n(WarningKind::TranslationFailure, stats.failed);

        let translated_title = match translation.translate_text(&title) {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!("标题翻译失败，使用原标题: {}", e);
                report.warn(WarningKind::TranslationFailure);
                title.clone()
            }
        };

        report.links_rewritten = rewrite_links(region.root(), &base_url, self.options.link_mode);

        // 5. 图片本地化，资源目录相对输出文件
        let output_path = PathBuf::from(format_output_path(output, Some(&title)));
        let output_root = output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        self.check_cancelled()?;
        let assets = localize_images(
            region.root(),
            &base_url,
            self.collaborators.fetcher(),
            &AssetOptions::new(self.options.asset_dir.clone(), output_root)
                .with_replacements(self.options.image_replacements.clone()),
            &WorkerPool::new(self.options.workers),
        );
        report.images_localized = assets.localized;
        report.images_replaced = assets.replaced;
        report.files_written = assets.files_written;
        report.warn_n(WarningKind::AssetFetchFailure, assets.failures.len());

        // 6. 组装并写入
        let assembler = DocumentAssembler::new(self.options.style.clone());
        let document = assembler.assemble(
            &translated_title,
            region,
            self.options.boundary.truncation_landmark(),
        );
        if document.truncation == Truncation::LandmarkNotFound {
            report.warn(WarningKind::AssemblyTruncationNotFound);
        }

        self.check_cancelled()?;
        let metadata = (!self.options.no_metadata).then(|| create_metadata_tag(page_url));
        report.bytes_written = document
            .write_to(&output_path, metadata.as_deref())
            .map_err(|source| WikiError::Io {
                path: output_path.clone(),
                source,
            })?;

        tracing::info!("已写入 {} ({} 字节)", output_path.display(), report.bytes_written);

        report.output = output_path;
        report.title = translated_title;
        Ok(report)
    }
}

/// 把命令行目标解析为 URL：`http(s)`/`file` URL 直接使用，其余视为本地文件路径
pub fn parse_target(target: &str) -> Result<Url, WikiError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(WikiError::InvalidUrl(target.to_string()));
    }

    if let Ok(url) = Url::parse(target) {
        match url.scheme() {
            "http" | "https" | "file" => return Ok(url),
            // Windows 盘符会被解析为单字母协议
            scheme if scheme.len() > 1 => return Err(WikiError::InvalidUrl(target.to_string())),
            _ => {}
        }
    }

    let path = Path::new(target);
    let canonical = fs::canonicalize(path).map_err(|_| WikiError::InvalidUrl(target.to_string()))?;
    Url::from_file_path(canonical).map_err(|_| WikiError::InvalidUrl(target.to_string()))
}

/// 处理一个页面
///
/// 协作者在运行结束时释放。设置了 `deadline` 时流程在独立线程中执行，
/// 超时后立即返回 [`WikiError::Timeout`]；仍在运行的流程不会再写入任何文件。
pub fn process_page(
    target: &str,
    output: &str,
    options: WikiOptions,
    collaborators: Collaborators,
) -> Result<RunReport, WikiError> {
    let page_url = parse_target(target)?;

    match options.deadline {
        Some(deadline) => {
            run_with_deadline(page_url, output.to_string(), options, collaborators, deadline)
        }
        None => DocumentProcessor::new(&options, &collaborators).process(&page_url, output),
    }
}

fn run_with_deadline(
    page_url: Url,
    output: String,
    options: WikiOptions,
    collaborators: Collaborators,
    deadline: Duration,
) -> Result<RunReport, WikiError> {
    let (sender, receiver) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();

    let spawned = thread::Builder::new()
        .name("wikitrans-pipeline".to_string())
        .spawn(move || {
            let result = DocumentProcessor::new(&options, &collaborators)
                .with_cancellation(flag)
                .process(&page_url, &output);
            // 调用方已超时返回时接收端不存在
            let _ = sender.send(result);
        });

    if let Err(e) = spawned {
        return Err(WikiError::Config(format!("cannot start pipeline thread: {e}")));
    }

    match receiver.recv_timeout(deadline) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancelled.store(true, Ordering::SeqCst);
            tracing::error!("运行超过 {:?}，放弃等待", deadline);
            Err(WikiError::Timeout(deadline))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(WikiError::Config("pipeline thread terminated unexpectedly".to_string()))
        }
    }
}

/// 替换输出路径中的占位符，并清理标题中不能用于文件名的字符
pub fn format_output_path(path: &str, document_title: Option<&str>) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let title = document_title.unwrap_or("");

    let sanitized = title
        .to_string()
        .replace(['/', '\\'], "_")
        .replace('<', "[")
        .replace('>', "]")
        .replace(':', " - ")
        .replace('\"', "")
        .replace('|', "-")
        .replace('?', "")
        .replace('*', "")
        .trim_start_matches('.')
        .trim()
        .to_string();
    let sanitized = if sanitized.is_empty() && path.contains("%title%") {
        "untitled".to_string()
    } else {
        sanitized
    };

    path.replace("%timestamp%", &datetime.replace(':', "_"))
        .replace("%title%", &sanitized)
}
