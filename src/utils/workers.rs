//! 有界工作线程池
//!
//! 翻译和图片抓取都是逐项独立的阻塞调用。结果按输入顺序返回，
//! 调用方再按下标写回各自的节点，保证文档顺序不变。

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub struct WorkerPool {
    pool: Option<ThreadPool>,
}

impl WorkerPool {
    /// 创建 `workers` 个线程的池；`workers <= 1` 或创建失败时退化为顺序执行
    pub fn new(workers: usize) -> Self {
        if workers <= 1 {
            return Self::sequential();
        }

        match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("wikitrans-worker-{index}"))
            .build()
        {
            Ok(pool) => Self { pool: Some(pool) },
            Err(e) => {
                tracing::warn!("无法创建线程池，改为顺序执行: {}", e);
                Self::sequential()
            }
        }
    }

    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn workers(&self) -> usize {
        self.pool
            .as_ref()
            .map(ThreadPool::current_num_threads)
            .unwrap_or(1)
    }

    /// 对每一项执行 `f`，结果顺序与输入一致
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(&f).collect()),
            None => items.iter().map(f).collect(),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(crate::core::DEFAULT_WORKERS)
    }
}
