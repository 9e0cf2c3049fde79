//! 退避重试执行器
//!
//! 包装单个不可靠的远程调用：失败后按"基础等待 + 线性递增 + 随机抖动"
//! 的节奏重试，重试耗尽后返回 `None` 而不是向上传播错误。
//! 调用方必须把 `None` 理解为"本批分类不可用"，而不是崩溃。

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 退避参数
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// 基础等待
    pub base: Duration,
    /// 每次失败后递增的步长
    pub step: Duration,
    /// 随机抖动上限，用于避免多个客户端同步重试
    pub jitter: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, step: Duration, jitter: Duration) -> Self {
        Self { base, step, jitter }
    }

    /// 第 `attempt` 次失败（0-based）之后、加抖动之前的等待时长
    ///
    /// 随尝试次数单调不减
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.base + self.step * attempt as u32
    }

    /// 实际等待时长：确定部分加上 [0, jitter] 内均匀抽取的抖动
    fn jittered_delay_for(&self, attempt: usize) -> Duration {
        let jitter_ms = if self.jitter.is_zero() {
            0
        } else {
            rand::rng().random_range(0..=self.jitter.as_millis() as u64)
        };
        self.delay_for(attempt) + Duration::from_millis(jitter_ms)
    }
}

/// 执行一个可能失败的异步操作，最多尝试 `max_attempts` 次
///
/// 每次失败后按策略等待再重试；全部失败时返回 `None`。
/// 不缓存结果，批次之间相互独立，没有跨批次的熔断。
pub async fn execute<T, E, F, Fut>(
    policy: &BackoffPolicy,
    max_attempts: usize,
    mut operation: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    for attempt in 0..max_attempts {
        match operation().await {
            Ok(value) => return Some(value),
            Err(e) => {
                let wait = policy.jittered_delay_for(attempt);
                warn!(
                    "⚠️ 第 {}/{} 次尝试失败: {}（等待 {:.1}s 后重试）",
                    attempt + 1,
                    max_attempts,
                    e,
                    wait.as_secs_f64()
                );
                // 最后一次失败后不再等待，直接放弃
                if attempt + 1 < max_attempts {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    warn!("❌ 重试次数已用尽");
    None
}
