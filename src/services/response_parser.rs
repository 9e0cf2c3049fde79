//! 远程响应解析 - 业务能力层
//!
//! 把（可能畸形的）原始模型输出转成结构化记录序列。
//! 核心保证：无论输入多么糟糕，输出记录数恒等于本批评论数，
//! 任何失败都以占位记录的形式留在批次内部，绝不向上抛出。

use crate::models::record::{Comment, ParsedRecord, ERROR_LABEL, PARSE_ERROR_LABEL};
use regex::Regex;
use tracing::{debug, warn};

/// 解析一批评论的远程响应
///
/// 结构化解析失败时每条评论得到一条 `ParseError` 占位记录；
/// 解析成功但记录数与评论数不一致时，多余的记录被截断，
/// 缺少的位置用 `Error` 占位记录补齐（属于"意外失败"类别）
pub fn parse_batch_response(raw: &str, comments: &[Comment]) -> Vec<ParsedRecord> {
    let cleaned = clean_response(raw);

    match serde_json::from_str::<Vec<ParsedRecord>>(&cleaned) {
        Ok(mut records) => {
            if records.len() != comments.len() {
                warn!(
                    "⚠️ 响应记录数不匹配: 期望 {} 条，实际 {} 条，已对齐",
                    comments.len(),
                    records.len()
                );
                records.truncate(comments.len());
                while records.len() < comments.len() {
                    let comment = &comments[records.len()];
                    records.push(ParsedRecord::placeholder(&comment.text, ERROR_LABEL));
                }
            }
            debug!("响应解析成功，共 {} 条记录", records.len());
            records
        }
        Err(e) => {
            let preview: String = cleaned.chars().take(300).collect();
            warn!("⚠️ JSON 解析失败: {}，原始内容前300字符: {}", e, preview);
            failure_placeholders(comments, PARSE_ERROR_LABEL)
        }
    }
}

/// 为整批评论构造同一标签的占位记录
///
/// 远程调用重试耗尽（Executor 返回 None）时由批次流程直接调用，
/// 标签为 `Error`，与结构化解析失败的 `ParseError` 保持可区分
pub fn failure_placeholders(comments: &[Comment], label: &str) -> Vec<ParsedRecord> {
    comments
        .iter()
        .map(|c| ParsedRecord::placeholder(&c.text, label))
        .collect()
}

/// 清理响应中的附带格式
///
/// 依次剥离首尾空白、反引号围栏和开头的 json 语言标记，
/// 例如 ```json\n[...]\n``` 和 "json [...]" 都能正确还原
fn clean_response(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('`').trim();

    // 围栏剥掉之后可能还留着语言标记
    if let Ok(lang_tag) = Regex::new(r"(?i)^json\s*") {
        lang_tag.replace(trimmed, "").to_string()
    } else {
        trimmed.to_string()
    }
}
