use crate::error::{AppError, AppResult, FileError};
use crate::models::record::Comment;
use std::path::Path;
use tokio::fs;

/// 从 CSV 文件加载评论列表
///
/// 文本列为空或缺失的行在处理开始前就被丢弃，
/// 丢弃之后的行序决定了整个流水线使用的评论顺序
pub async fn load_comments(path: &str, text_column: &str) -> AppResult<Vec<Comment>> {
    if !Path::new(path).exists() {
        return Err(AppError::File(FileError::NotFound {
            path: path.to_string(),
        }));
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path, e))?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::file_read_failed(path, e))?;
    let column_index = headers
        .iter()
        .position(|h| h == text_column)
        .ok_or_else(|| {
            AppError::File(FileError::MissingColumn {
                path: path.to_string(),
                column: text_column.to_string(),
            })
        })?;

    let mut comments = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| AppError::file_read_failed(path, e))?;
        let text = record.get(column_index).unwrap_or("").trim();
        if text.is_empty() {
            dropped += 1;
            continue;
        }
        comments.push(Comment::new(comments.len(), text));
    }

    if dropped > 0 {
        tracing::info!("已丢弃 {} 行空评论", dropped);
    }

    Ok(comments)
}
