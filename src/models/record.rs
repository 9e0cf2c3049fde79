//! 核心数据模型
//!
//! 评论、情感标签、本地预打分与最终分类结果。
//! 不变量：每条被处理的评论恰好对应一条 `ClassificationResult`，
//! 顺序与输入一致，既不重复也不缺行。

use serde::{Deserialize, Serialize};

/// 结构化解析失败时的占位标签
pub const PARSE_ERROR_LABEL: &str = "ParseError";
/// 其他意外失败（包括远程调用重试耗尽）时的占位标签
pub const ERROR_LABEL: &str = "Error";

/// 一条输入评论
///
/// `index` 是丢弃空行之后在输入文件中的行号（0-based），
/// 在整个流水线中保持不变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub index: usize,
    pub text: String,
}

impl Comment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// 三分类情感标签（本地词典启发式的输出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// 按极性阈值导出标签：> 0.2 为正面，< -0.2 为负面，其余为中性
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.2 {
            SentimentLabel::Positive
        } else if polarity < -0.2 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "Positive" => Some(SentimentLabel::Positive),
            "Negative" => Some(SentimentLabel::Negative),
            "Neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 本地词典启发式产生的预打分
///
/// 只在批次构建期间临时存在；两阶段模式下会随最终结果一起持久化
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalScore {
    /// 极性，范围 [-1, 1]
    pub polarity: f64,
    /// 按阈值导出的三分类标签
    pub label: SentimentLabel,
}

/// 远程响应中单条记录的结构化形式
///
/// 字段全部宽松处理：解析器只保证结构合法和数量对齐，
/// 不校验语义内容（例如 score 是否落在 [-1, 1]）
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedRecord {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub sentiment: String,
}

impl ParsedRecord {
    /// 构造占位记录，保证批次的输出行数等于输入行数
    pub fn placeholder(comment: &str, label: &str) -> Self {
        Self {
            comment: comment.to_string(),
            score: None,
            sentiment: label.to_string(),
        }
    }
}

/// 最终持久化的分类结果
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// 原始评论文本
    pub comment: String,
    /// 远程模型给出的情感得分（可空，占位行为空）
    pub score: Option<f64>,
    /// 情感标签：模型返回的标签原样保留，或占位标签
    pub sentiment: String,
    /// 两阶段模式下携带的本地预打分
    pub local: Option<LocalScore>,
}
