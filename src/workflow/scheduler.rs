//! 批次调度 - 流程层
//!
//! 纯窗口划分：把未处理的输入区间切成连续、不重叠、保序的
//! 固定大小窗口（最后一个窗口可能更短）。
//! 不包含重试，不包含持久化。

use std::ops::Range;

/// 批次调度器
#[derive(Debug)]
pub struct BatchScheduler {
    total: usize,
    cursor: usize,
    batch_size: usize,
}

impl BatchScheduler {
    /// 从恢复偏移量开始调度
    pub fn new(total: usize, resume_offset: usize, batch_size: usize) -> Self {
        Self {
            total,
            cursor: resume_offset,
            batch_size: batch_size.max(1),
        }
    }

    /// 取下一个窗口；输入耗尽时返回 None
    pub fn next_window(&mut self) -> Option<Range<usize>> {
        if self.cursor >= self.total {
            return None;
        }
        let start = self.cursor;
        let end = (start + self.batch_size).min(self.total);
        self.cursor = end;
        Some(start..end)
    }

    /// 剩余批次数
    pub fn remaining_batches(&self) -> usize {
        let remaining = self.total.saturating_sub(self.cursor);
        remaining.div_ceil(self.batch_size)
    }
}
