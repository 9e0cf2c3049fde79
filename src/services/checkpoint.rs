//! 检查点存储 - 业务能力层
//!
//! 持久化结果的唯一写入方。输出文件的行数就是断点续传的唯一信号：
//! `load` 返回已有行数作为恢复偏移量，`append` 在每个批次完成后
//! 把"已有结果 + 本批结果"整体写回，保证崩溃之后磁盘上的内容
//! 永远是最近一个完整批次的前缀（批次级原子性，不存在半行）。

use crate::error::{AppError, AppResult, CheckpointError};
use crate::models::record::{ClassificationResult, LocalScore, SentimentLabel};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// 单阶段输出列
const SINGLE_STAGE_HEADERS: [&str; 3] = ["comment", "score", "sentiment"];
/// 两阶段输出列
const TWO_STAGE_HEADERS: [&str; 4] = [
    "comment",
    "local_polarity",
    "local_sentiment",
    "refined_sentiment",
];

/// 检查点存储
#[derive(Debug)]
pub struct CheckpointStore {
    path: String,
    two_stage: bool,
    results: Vec<ClassificationResult>,
}

impl CheckpointStore {
    /// 加载已有的检查点
    ///
    /// 输出文件不存在时从零开始；存在但无法解析时返回致命错误，
    /// 不做任何静默修复
    pub async fn load(path: &str, two_stage: bool) -> AppResult<Self> {
        if !Path::new(path).exists() {
            info!("未找到已有输出，从头开始");
            return Ok(Self {
                path: path.to_string(),
                two_stage,
                results: Vec::new(),
            });
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AppError::checkpoint_load_failed(path, e))?;

        let results = parse_checkpoint(path, &content, two_stage)?;

        info!("从第 {} 行继续处理", results.len());

        Ok(Self {
            path: path.to_string(),
            two_stage,
            results,
        })
    }

    /// 恢复偏移量：已持久化的结果数
    pub fn resume_offset(&self) -> usize {
        self.results.len()
    }

    pub fn results(&self) -> &[ClassificationResult] {
        &self.results
    }

    /// 追加一个完整批次的结果并整体写回磁盘
    ///
    /// 必须一次性传入本批的全部结果；函数返回时磁盘内容
    /// 已与内存中的累积结果一致
    pub async fn append(&mut self, batch_results: Vec<ClassificationResult>) -> AppResult<()> {
        self.results.extend(batch_results);
        self.persist().await?;
        debug!("检查点已更新，累计 {} 行", self.results.len());
        Ok(())
    }

    /// 整体写回：先写临时文件再原子重命名，崩溃时不会留下半截文件
    async fn persist(&self) -> AppResult<()> {
        let bytes = self.serialize_all().map_err(|e| {
            AppError::Checkpoint(CheckpointError::PersistFailed {
                path: self.path.clone(),
                source: Box::new(e),
            })
        })?;

        let tmp_path = format!("{}.tmp", self.path);
        fs::write(&tmp_path, bytes).await.map_err(|e| {
            AppError::Checkpoint(CheckpointError::PersistFailed {
                path: self.path.clone(),
                source: Box::new(e),
            })
        })?;
        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            AppError::Checkpoint(CheckpointError::PersistFailed {
                path: self.path.clone(),
                source: Box::new(e),
            })
        })?;

        Ok(())
    }

    fn serialize_all(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        if self.two_stage {
            writer.write_record(TWO_STAGE_HEADERS)?;
            for result in &self.results {
                let (polarity, label) = match &result.local {
                    Some(local) => (local.polarity.to_string(), local.label.as_str().to_string()),
                    None => (String::new(), String::new()),
                };
                writer.write_record([
                    result.comment.as_str(),
                    polarity.as_str(),
                    label.as_str(),
                    result.sentiment.as_str(),
                ])?;
            }
        } else {
            writer.write_record(SINGLE_STAGE_HEADERS)?;
            for result in &self.results {
                let score = result.score.map(|s| s.to_string()).unwrap_or_default();
                writer.write_record([
                    result.comment.as_str(),
                    score.as_str(),
                    result.sentiment.as_str(),
                ])?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))
    }
}

/// 把已有输出文件解析为结果列表，任何不一致都按损坏处理
fn parse_checkpoint(
    path: &str,
    content: &str,
    two_stage: bool,
) -> AppResult<Vec<ClassificationResult>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());

    let expected: &[&str] = if two_stage {
        &TWO_STAGE_HEADERS
    } else {
        &SINGLE_STAGE_HEADERS
    };

    let headers = reader
        .headers()
        .map_err(|e| AppError::checkpoint_load_failed(path, e))?
        .clone();

    if headers.iter().collect::<Vec<_>>() != expected {
        return Err(AppError::Checkpoint(CheckpointError::SchemaMismatch {
            path: path.to_string(),
            expected: expected.join(","),
            found: headers.iter().collect::<Vec<_>>().join(","),
        }));
    }

    let mut results = Vec::new();

    for (row_index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AppError::checkpoint_load_failed(path, e))?;
        let row = row_index + 2; // 报错时按文件行号（含表头）定位

        let corrupt = |detail: String| {
            AppError::Checkpoint(CheckpointError::CorruptRow {
                path: path.to_string(),
                row,
                detail,
            })
        };

        let comment = record.get(0).unwrap_or("").to_string();

        if two_stage {
            let polarity_raw = record.get(1).unwrap_or("");
            let label_raw = record.get(2).unwrap_or("");
            let local = if polarity_raw.is_empty() && label_raw.is_empty() {
                None
            } else {
                let polarity = polarity_raw
                    .parse::<f64>()
                    .map_err(|e| corrupt(format!("极性 '{}' 无法解析: {}", polarity_raw, e)))?;
                let label = SentimentLabel::from_str_opt(label_raw)
                    .ok_or_else(|| corrupt(format!("未知的本地标签 '{}'", label_raw)))?;
                Some(LocalScore { polarity, label })
            };
            results.push(ClassificationResult {
                comment,
                score: None,
                sentiment: record.get(3).unwrap_or("").to_string(),
                local,
            });
        } else {
            let score_raw = record.get(1).unwrap_or("");
            let score = if score_raw.is_empty() {
                None
            } else {
                Some(
                    score_raw
                        .parse::<f64>()
                        .map_err(|e| corrupt(format!("得分 '{}' 无法解析: {}", score_raw, e)))?,
                )
            };
            results.push(ClassificationResult {
                comment,
                score,
                sentiment: record.get(2).unwrap_or("").to_string(),
                local: None,
            });
        }
    }

    Ok(results)
}
