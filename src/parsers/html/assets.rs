//! 图片资源本地化
//!
//! 对正文区域中的每个 `<img>`：
//! - 把 `src` 相对页面 URL 解析为绝对地址
//! - 按 URL 路径映射出确定的本地路径（`https://site/x/y.png` → `images/x/y.png`）
//! - 抓取并原子写入本地文件，然后把 `src` 改写为本地相对路径
//!
//! 抓取之前先查图片替换表：命中的地址（`src` 和 `srcset` 候选项）换成表中指定的图片。
//!
//! 单张图片失败不会中止运行：`src` 改为远程绝对地址，失败被记录下来。
//! 相同 URL 只抓取一次，抓取在工作线程池上并行，结果按元素写回。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use markup5ever_rcdom::Handle;
use thiserror::Error;
use url::Url;

use crate::network::fetcher::{FetchError, Fetcher};
use crate::utils::fs::write_atomically;
use crate::utils::url::{is_fetchable, local_asset_path, path_to_href, resolve_url};
use crate::utils::workers::WorkerPool;

use super::dom::{find_nodes, get_node_attr, set_node_attr};
use super::parser::{format_srcset, parse_srcset};

/// 默认资源目录（相对输出文件所在目录）
pub const DEFAULT_ASSET_DIR: &str = "images";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("URL has no path to map to a local file")]
    NoLocalPath,

    #[error("invalid image replacement table: {0}")]
    Replacements(String),
}

/// 图片替换表：JSON 对象 `{ "原图绝对地址": "替换图片地址" }`
///
/// 替换地址可以是相对地址，使用时相对页面地址解析。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReplacements {
    map: HashMap<String, String>,
}

impl ImageReplacements {
    pub fn new(entries: HashMap<String, String>) -> Self {
        let map = entries
            .into_iter()
            .filter_map(|(from, to)| {
                let from = from.trim();
                let to = to.trim();
                if from.is_empty() || to.is_empty() {
                    return None;
                }
                // 键按 URL 规范化，和解析后的图片地址比较
                let from = Url::parse(from)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| from.to_string());
                Some((from, to.to_string()))
            })
            .collect();
        Self { map }
    }

    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let entries: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| AssetError::Replacements(format!("解析图片替换表失败: {e}")))?;
        Ok(Self::new(entries))
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AssetError::Replacements(format!("读取图片替换表 {} 失败: {}", path.display(), e))
        })?;
        let replacements = Self::from_json(&json)?;
        tracing::info!("图片替换表加载完成，共 {} 条规则", replacements.len());
        Ok(replacements)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 查找替换图片；没有规则或替换地址无法解析时返回 `None`
    pub fn replace(&self, absolute: &Url, base_url: &Url) -> Option<Url> {
        let target = self.map.get(absolute.as_str())?;
        resolve_url(base_url, target)
    }
}

#[derive(Debug, Clone)]
pub struct AssetOptions {
    /// 写入 HTML 的资源目录（相对引用的前缀）
    pub asset_dir: PathBuf,
    /// 资源目录在磁盘上的基准目录，通常是输出文件的父目录
    pub output_root: PathBuf,
    pub replacements: ImageReplacements,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            output_root: PathBuf::from("."),
            replacements: ImageReplacements::default(),
        }
    }
}

impl AssetOptions {
    pub fn new(asset_dir: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            output_root: output_root.into(),
            replacements: ImageReplacements::default(),
        }
    }

    pub fn with_replacements(mut self, replacements: ImageReplacements) -> Self {
        self.replacements = replacements;
        self
    }

    fn disk_path(&self, relative: &Path) -> PathBuf {
        self.output_root.join(relative)
    }
}

#[derive(Debug)]
pub struct AssetFailure {
    pub url: String,
    pub error: AssetError,
}

#[derive(Debug, Default)]
pub struct AssetReport {
    /// 成功本地化的 `<img>` 数量
    pub localized: usize,
    /// 成功写入的不同文件数量
    pub files_written: usize,
    /// 按替换表换掉的 `<img>` 数量
    pub replaced: usize,
    pub failures: Vec<AssetFailure>,
}

struct Job {
    url: Url,
    relative: PathBuf,
}

/// 本地化区域内所有图片
pub fn localize_images(
    root: &Handle,
    base_url: &Url,
    fetcher: &dyn Fetcher,
    options: &AssetOptions,
    workers: &WorkerPool,
) -> AssetReport {
    let mut report = AssetReport::default();

    let mut jobs: Vec<Job> = Vec::new();
    let mut job_index: HashMap<String, usize> = HashMap::new();
    // (元素, 绝对 URL, 对应任务)
    let mut targets: Vec<(Handle, Url, Option<usize>)> = Vec::new();

    for img in find_nodes(root, &["img"]) {
        let Some(src) = get_node_attr(&img, "src") else {
            continue;
        };
        if src.trim().is_empty() || src.trim_start().starts_with("data:") {
            continue;
        }
        let Some(absolute) = resolve_url(base_url, &src) else {
            tracing::debug!("无法解析图片地址: {}", src);
            continue;
        };
        let absolute = match options.replacements.replace(&absolute, base_url) {
            Some(replacement) => {
                tracing::debug!("替换图片 {} → {}", absolute, replacement);
                report.replaced += 1;
                if !is_fetchable(&replacement) {
                    set_node_attr(&img, "src", Some(replacement.to_string()));
                    continue;
                }
                replacement
            }
            None => absolute,
        };
        if !is_fetchable(&absolute) {
            continue;
        }

        let job = match job_index.get(absolute.as_str()) {
            Some(index) => Some(*index),
            None => match local_asset_path(&absolute, &options.asset_dir) {
                Some(relative) => {
                    jobs.push(Job {
                        url: absolute.clone(),
                        relative,
                    });
                    job_index.insert(absolute.to_string(), jobs.len() - 1);
                    Some(jobs.len() - 1)
                }
                None => None,
            },
        };
        targets.push((img, absolute, job));
    }

    tracing::info!(
        "发现 {} 个图片引用，{} 个待下载资源",
        targets.len(),
        jobs.len()
    );

    let results: Vec<Result<(), AssetError>> = workers.map(&jobs, |job| {
        let data = fetcher.fetch(&job.url)?;
        let path = options.disk_path(&job.relative);
        write_atomically(&path, &data).map_err(|source| AssetError::Write { path, source })?;
        tracing::debug!("已保存图片 {} → {}", job.url, job.relative.display());
        Ok(())
    });

    // 每个 URL 对应的本地引用；只包含成功写入的资源
    let mut localized: HashMap<&str, String> = HashMap::new();
    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(()) => {
                report.files_written += 1;
                localized.insert(job.url.as_str(), path_to_href(&job.relative));
            }
            Err(error) => {
                tracing::warn!("图片本地化失败 {}: {}", job.url, error);
                report.failures.push(AssetFailure {
                    url: job.url.to_string(),
                    error,
                });
            }
        }
    }

    for (img, absolute, job) in &targets {
        match localized.get(absolute.as_str()) {
            Some(href) => {
                set_node_attr(img, "src", Some(href.clone()));
                report.localized += 1;
            }
            None => {
                if job.is_none() {
                    tracing::warn!("图片本地化失败 {}: {}", absolute, AssetError::NoLocalPath);
                    report.failures.push(AssetFailure {
                        url: absolute.to_string(),
                        error: AssetError::NoLocalPath,
                    });
                }
                set_node_attr(img, "src", Some(absolute.to_string()));
            }
        }
    }

    for img in find_nodes(root, &["img"]) {
        if let Some(srcset) = get_node_attr(&img, "srcset") {
            let rewritten = rewrite_srcset(&srcset, base_url, &options.replacements, &localized);
            set_node_attr(&img, "srcset", Some(rewritten));
        }
    }

    report
}

/// 改写 srcset：先按替换表换图，已本地化的候选项指向本地文件，其余改为绝对地址
fn rewrite_srcset(
    srcset: &str,
    base_url: &Url,
    replacements: &ImageReplacements,
    localized: &HashMap<&str, String>,
) -> String {
    let items: Vec<(String, String)> = parse_srcset(srcset)
        .into_iter()
        .map(|item| {
            let path = if item.path.starts_with("data:") {
                item.path.to_string()
            } else {
                match resolve_url(base_url, item.path)
                    .map(|absolute| replacements.replace(&absolute, base_url).unwrap_or(absolute))
                {
                    Some(absolute) => localized
                        .get(absolute.as_str())
                        .cloned()
                        .unwrap_or_else(|| absolute.to_string()),
                    None => item.path.to_string(),
                }
            };
            (path, item.descriptor.to_string())
        })
        .collect();

    format_srcset(&items)
}
