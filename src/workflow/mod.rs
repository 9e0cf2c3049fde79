//! 流程层（Workflow Layer）
//!
//! ## 职责
//!
//! 定义"一个批次"的处理流程与批次窗口的划分：
//!
//! ### `scheduler` - 批次调度器
//! - 纯窗口划分，连续、不重叠、保序
//! - 不包含重试和持久化
//!
//! ### `batch_flow` - 批次处理流程
//! - 预打分 → 提示词 → 退避调用 → 解析 → 拼接结果
//! - 保证输出行数等于输入行数
//! - 远程客户端作为注入的依赖

pub mod batch_flow;
pub mod scheduler;

pub use batch_flow::BatchFlow;
pub use scheduler::BatchScheduler;
