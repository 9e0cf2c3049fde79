//! 本地词典预打分 - 业务能力层
//!
//! 纯函数式的情感启发式：不访问网络、不持有状态，
//! 同一段文本永远得到同一个 `LocalScore`。
//! 两阶段模式下用于在远程精分类之前给出一个廉价的粗打分。

use crate::models::record::{LocalScore, SentimentLabel};
use phf::phf_map;

/// 情感词权重表，取值范围 [-1, 1]
static WORD_WEIGHTS: phf::Map<&'static str, f64> = phf_map! {
    // 正面
    "good" => 0.6,
    "great" => 0.8,
    "excellent" => 0.9,
    "amazing" => 0.9,
    "awesome" => 0.9,
    "fantastic" => 0.9,
    "perfect" => 0.9,
    "love" => 0.8,
    "loved" => 0.8,
    "best" => 0.9,
    "nice" => 0.5,
    "happy" => 0.7,
    "helpful" => 0.6,
    "pleasant" => 0.6,
    "satisfied" => 0.6,
    "recommend" => 0.7,
    "fine" => 0.3,
    "works" => 0.3,
    "fast" => 0.4,
    "easy" => 0.4,
    // 负面
    "bad" => -0.6,
    "terrible" => -0.9,
    "awful" => -0.9,
    "horrible" => -0.9,
    "worst" => -0.9,
    "hate" => -0.8,
    "hated" => -0.8,
    "poor" => -0.6,
    "broken" => -0.7,
    "useless" => -0.8,
    "disappointing" => -0.7,
    "disappointed" => -0.7,
    "waste" => -0.8,
    "annoying" => -0.6,
    "slow" => -0.4,
    "buggy" => -0.6,
    "refund" => -0.5,
    "crash" => -0.7,
    "crashes" => -0.7,
};

/// 否定词：翻转下一个情感词的极性
static NEGATORS: &[&str] = &["not", "no", "never", "dont", "don't", "isnt", "isn't", "wasnt", "wasn't"];

/// 程度副词：放大下一个情感词的权重
static INTENSIFIERS: &[&str] = &["very", "really", "extremely", "so", "totally"];

/// 对一段文本做词典打分
///
/// 极性是所有命中词权重的均值（截断到 [-1, 1]），
/// 没有命中任何词时极性为 0.0，标签为 Neutral
pub fn score(text: &str) -> LocalScore {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect();

    let mut weights = Vec::new();
    let mut negate = false;
    let mut intensity = 1.0_f64;

    for token in tokens {
        if NEGATORS.contains(&token) {
            negate = true;
            continue;
        }
        if INTENSIFIERS.contains(&token) {
            intensity = 1.5;
            continue;
        }

        if let Some(&weight) = WORD_WEIGHTS.get(token) {
            let mut w = weight * intensity;
            if negate {
                w = -w;
            }
            weights.push(w.clamp(-1.0, 1.0));
        }

        // 否定和程度修饰只作用于紧随其后的情感词
        negate = false;
        intensity = 1.0;
    }

    let polarity = if weights.is_empty() {
        0.0
    } else {
        (weights.iter().sum::<f64>() / weights.len() as f64).clamp(-1.0, 1.0)
    };

    LocalScore {
        polarity,
        label: SentimentLabel::from_polarity(polarity),
    }
}
