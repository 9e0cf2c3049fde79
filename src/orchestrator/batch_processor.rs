//! 批量分类处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责把一次可断点续传的完整运行串起来。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载输入评论、加载检查点、创建 LLM 服务
//! 2. **断点续传**：以检查点行数作为恢复偏移量，跳过已处理前缀
//! 3. **批次循环**：调度器出窗口 → 批次流程分类 → 检查点落盘
//! 4. **频率控制**：批次之间固定停顿
//! 5. **全局统计**：汇总成功与占位行数量
//!
//! ## 设计特点
//!
//! - **严格串行**：同一时刻只有一个批次在处理，上一批落盘后才开始下一批
//! - **批次失败不终止**：占位行保证行数对齐，运行继续推进
//! - **致命错误前置**：输入缺失、检查点损坏在进入循环前就中止

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::record::{Comment, ERROR_LABEL, PARSE_ERROR_LABEL};
use crate::models::load_comments;
use crate::services::{CheckpointStore, LlmService, RemoteClassifier};
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_input_loaded, log_startup, print_final_stats,
};
use crate::workflow::{BatchFlow, BatchScheduler};

/// 应用主结构
#[derive(Debug)]
pub struct App<C> {
    config: Config,
    comments: Vec<Comment>,
    store: CheckpointStore,
    classifier: C,
}

/// 一次运行的统计结果
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    /// 本次运行处理的评论数（不含检查点中已有的）
    pub processed: usize,
    /// 输出中的成功行数
    pub ok: usize,
    /// 输出中的占位行数（ParseError + Error）
    pub failed: usize,
    /// 输出总行数
    pub total: usize,
}

impl App<LlmService> {
    /// 使用生产环境的 LLM 服务初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let classifier = LlmService::new(&config);
        Self::with_classifier(config, classifier).await
    }
}

impl<C: RemoteClassifier> App<C> {
    /// 使用注入的分类器初始化应用
    ///
    /// 输入文件缺失或检查点损坏时直接返回错误，不进入批次循环
    pub async fn with_classifier(config: Config, classifier: C) -> Result<Self> {
        log_startup(&config);

        let comments = load_comments(&config.input_file, &config.text_column).await?;
        let store = CheckpointStore::load(&config.output_file, config.two_stage).await?;

        Ok(Self {
            config,
            comments,
            store,
            classifier,
        })
    }

    /// 运行应用主逻辑：从恢复偏移量开始的批次循环
    pub async fn run(mut self) -> Result<RunStats> {
        let total = self.comments.len();

        if total == 0 {
            warn!("⚠️ 输入中没有非空评论，程序结束");
            return Ok(RunStats::default());
        }

        let resume_offset = self.store.resume_offset();
        log_input_loaded(total, resume_offset);

        if resume_offset > total {
            warn!(
                "⚠️ 检查点行数 ({}) 超过输入评论数 ({})，请确认输入输出文件是否匹配",
                resume_offset, total
            );
        }

        let mut scheduler = BatchScheduler::new(total, resume_offset, self.config.batch_size);
        let total_batches = scheduler.remaining_batches();
        let flow = BatchFlow::new(&self.config, &self.classifier);

        let mut batch_num = 0usize;
        let mut processed = 0usize;

        while let Some(window) = scheduler.next_window() {
            batch_num += 1;
            log_batch_start(batch_num, total_batches, window.start, window.end, total);

            let batch = &self.comments[window.clone()];
            let results = flow.run(batch).await;

            let ok = results
                .iter()
                .filter(|r| r.sentiment != PARSE_ERROR_LABEL && r.sentiment != ERROR_LABEL)
                .count();

            // 整批结果一次性落盘；返回后磁盘即与本批完成状态一致
            self.store.append(results).await?;

            processed += batch.len();
            log_batch_complete(
                batch_num,
                ok,
                batch.len(),
                self.store.resume_offset(),
                total,
            );

            // 固定的批间停顿，无论本批成功与否都生效
            tokio::time::sleep(Duration::from_millis(self.config.batch_pause_ms)).await;
        }

        if processed == 0 {
            info!("✓ 检查点已覆盖全部输入，无需处理");
        }

        let failed = self
            .store
            .results()
            .iter()
            .filter(|r| r.sentiment == PARSE_ERROR_LABEL || r.sentiment == ERROR_LABEL)
            .count();
        let stats = RunStats {
            processed,
            ok: self.store.resume_offset() - failed,
            failed,
            total: self.store.resume_offset(),
        };

        print_final_stats(stats.ok, stats.failed, stats.total, &self.config.output_file);

        Ok(stats)
    }
}
