//! 有界重试
//!
//! 远程调用（翻译、抓取、渲染）失败后按指数退避重试，等待时间有上限，
//! 尝试次数也有上限，后端不可达时不会无限阻塞。

use std::fmt::Display;
use std::thread;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次），至少为 1
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// 只尝试一次
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn with_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// 第 `attempt` 次失败后的等待时间（从 0 开始计数）
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// 执行 `op`，可重试的错误在退避后重试，直到成功或用尽次数
    pub fn run<T, E, F, R>(&self, label: &str, mut op: F, is_retryable: R) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
        R: Fn(&E) -> bool,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match op(attempt) {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!("{} 在第 {} 次重试后成功", label, attempt);
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt + 1 >= attempts || !is_retryable(&error) {
                        return Err(error);
                    }
                    let delay = self.delay_for(attempt);
                    tracing::debug!(
                        "{} 失败，{:.1}秒后进行第 {} 次重试: {}",
                        label,
                        delay.as_secs_f32(),
                        attempt + 1,
                        error
                    );
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
