//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (断点续传的批次循环)
//!     ↓
//! workflow::BatchScheduler (窗口划分) + workflow::BatchFlow (单个批次)
//!     ↓
//! services (能力层：llm / lexicon / parser / checkpoint)
//!     ↓
//! utils::backoff (退避重试)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：App 管循环与统计，BatchFlow 管单个批次
//! 2. **单一写入方**：只有 CheckpointStore 写输出文件
//! 3. **无业务逻辑**：只做调度和统计，不做具体分类判断

pub mod batch_processor;

pub use batch_processor::{App, RunStats};
