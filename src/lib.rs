//! # Sentiment Batch Classify
//!
//! 一个可断点续传的批量评论情感分类流水线
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础工具层（Utils）
//! - `utils/backoff` - 退避重试执行器，包装不可靠的远程调用
//! - `utils/logging` - 批次日志辅助函数
//!
//! ### ② 业务能力层（Services）
//! - `services/llm_service` - 远程情感分类能力（可注入替换）
//! - `services/lexicon` - 本地词典预打分能力
//! - `services/response_parser` - 容错的响应解析能力
//! - `services/checkpoint` - 检查点加载与落盘能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/scheduler` - 批次窗口划分
//! - `workflow/batch_flow` - 单个批次的完整处理流程
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 断点续传的批次循环与全局统计
//!
//! ## 核心不变量
//!
//! - 每条被处理的评论恰好产生一行结果，顺序与输入一致
//! - 输出文件的行数就是唯一的恢复信号
//! - 批次内的失败以占位行留在结果里，绝不让单批失败终止运行

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ClassificationResult, Comment, LocalScore, SentimentLabel};
pub use orchestrator::{App, RunStats};
pub use services::{CheckpointStore, LlmService, RemoteClassifier};
pub use workflow::{BatchFlow, BatchScheduler};
