//! 批次处理流程 - 流程层
//!
//! 核心职责：定义"一个批次"的完整处理流程
//!
//! 流程顺序：
//! 1. （两阶段模式）本地词典预打分
//! 2. 构建批次提示词
//! 3. 经退避执行器调用远程分类
//! 4. 解析响应（调用失败时直接生成占位记录）
//! 5. 按位置拼回原始评论，形成最终结果
//!
//! 返回的结果数恒等于输入评论数，失败以占位行的形式留在批次内。

use tracing::{info, warn};

use crate::config::Config;
use crate::models::record::{ClassificationResult, Comment, LocalScore, ERROR_LABEL};
use crate::services::llm_service::{build_batch_prompt, RemoteClassifier};
use crate::services::{lexicon, response_parser};
use crate::utils::backoff::{self, BackoffPolicy};
use crate::utils::logging::truncate_text;
use std::time::Duration;

/// 批次处理流程
///
/// - 编排单个批次的分类流程
/// - 不持有检查点，不推进游标
/// - 远程客户端作为注入的依赖
pub struct BatchFlow<'a, C> {
    classifier: &'a C,
    policy: BackoffPolicy,
    max_retries: usize,
    two_stage: bool,
    verbose_logging: bool,
}

impl<'a, C: RemoteClassifier> BatchFlow<'a, C> {
    /// 创建新的批次流程
    pub fn new(config: &Config, classifier: &'a C) -> Self {
        Self {
            classifier,
            policy: BackoffPolicy::new(
                Duration::from_millis(config.backoff_base_ms),
                Duration::from_millis(config.backoff_step_ms),
                Duration::from_millis(config.backoff_jitter_ms),
            ),
            max_retries: config.max_retries,
            two_stage: config.two_stage,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理一个批次，返回与输入等长的结果序列
    pub async fn run(&self, comments: &[Comment]) -> Vec<ClassificationResult> {
        // 1. 本地预打分（仅两阶段模式）
        let local_scores: Option<Vec<LocalScore>> = if self.two_stage {
            Some(comments.iter().map(|c| lexicon::score(&c.text)).collect())
        } else {
            None
        };

        if self.verbose_logging {
            for comment in comments {
                info!("  [{}] {}", comment.index + 1, truncate_text(&comment.text, 60));
            }
        }

        // 2. 构建提示词
        let prompt = build_batch_prompt(comments, local_scores.as_deref());

        // 3. 经退避执行器调用远程分类
        let raw = backoff::execute(&self.policy, self.max_retries, || {
            self.classifier.classify(&prompt)
        })
        .await;

        // 4. 解析响应；重试耗尽时整批生成 Error 占位记录
        let parsed = match raw {
            Some(content) => response_parser::parse_batch_response(&content, comments),
            None => {
                warn!("❌ 远程分类不可用，本批 {} 条评论写入占位行", comments.len());
                response_parser::failure_placeholders(comments, ERROR_LABEL)
            }
        };

        // 5. 按位置拼回原始评论
        comments
            .iter()
            .zip(parsed)
            .enumerate()
            .map(|(i, (comment, record))| ClassificationResult {
                comment: comment.text.clone(),
                score: record.score,
                sentiment: record.sentiment,
                local: local_scores.as_ref().map(|scores| scores[i]),
            })
            .collect()
    }
}
