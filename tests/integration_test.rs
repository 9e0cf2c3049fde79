//! 端到端集成测试
//!
//! 用可注入的假分类器驱动完整流水线，模拟瞬时失败和畸形响应，
//! 验证断点续传、行数对齐与失败占位行为。

use anyhow::Result;
use sentiment_batch_classify::config::Config;
use sentiment_batch_classify::models::record::{ERROR_LABEL, PARSE_ERROR_LABEL};
use sentiment_batch_classify::orchestrator::App;
use sentiment_batch_classify::services::RemoteClassifier;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// 按脚本依次返回预设响应的假分类器，并记录收到的提示词
#[derive(Debug)]
struct FakeClassifier {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeClassifier {
    fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// 永远失败的分类器
    fn always_failing() -> Self {
        Self::new(Vec::new())
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl RemoteClassifier for FakeClassifier {
    async fn classify(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("模拟的连接失败")))
    }
}

/// 在临时目录里准备输入文件和配置
async fn setup(input_csv: &str) -> (TempDir, Config) {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let input_file = dir.path().join("comments.csv");
    tokio::fs::write(&input_file, input_csv).await.unwrap();

    let config = Config {
        input_file: input_file.to_string_lossy().to_string(),
        output_file: dir.path().join("out.csv").to_string_lossy().to_string(),
        batch_pause_ms: 0,
        max_retries: 2,
        backoff_base_ms: 0,
        backoff_step_ms: 0,
        backoff_jitter_ms: 0,
        ..Config::default()
    };
    (dir, config)
}

/// 读取输出文件，返回 (表头, 数据行)
fn read_output(path: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let content = std::fs::read_to_string(path).expect("输出文件应存在");
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

const FOUR_ROW_INPUT: &str =
    "comment_text\ngreat product\n\nterrible service\nit's fine\n";

#[tokio::test]
async fn test_end_to_end_single_batch() {
    let (_dir, config) = setup(FOUR_ROW_INPUT).await;

    let classifier = FakeClassifier::new(vec![Ok(r#"[
        {"comment":"great product","score":0.8,"sentiment":"Positive"},
        {"comment":"terrible service","score":-0.6,"sentiment":"Negative"},
        {"comment":"it's fine","score":0.0,"sentiment":"Neutral"}
    ]"#
    .to_string())]);

    let output_file = config.output_file.clone();
    let stats = App::with_classifier(config, classifier)
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    // 空行被丢弃，3 条评论在一个批次内完成
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.ok, 3);
    assert_eq!(stats.failed, 0);

    let (headers, rows) = read_output(&output_file);
    assert_eq!(headers, vec!["comment", "score", "sentiment"]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["great product", "0.8", "Positive"]);
    assert_eq!(rows[1], vec!["terrible service", "-0.6", "Negative"]);
    assert_eq!(rows[2], vec!["it's fine", "0", "Neutral"]);
}

#[tokio::test]
async fn test_malformed_response_writes_placeholders_and_advances() {
    let (_dir, config) = setup("comment_text\nfirst comment\nsecond comment\n").await;

    let classifier = FakeClassifier::new(vec![Ok(
        "As an AI model I think these comments are mostly positive.".to_string(),
    )]);

    let output_file = config.output_file.clone();
    let stats = App::with_classifier(config, classifier)
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.processed, 2);
    assert_eq!(stats.failed, 2);

    let (_, rows) = read_output(&output_file);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r[2] == PARSE_ERROR_LABEL));
    assert!(rows.iter().all(|r| r[1].is_empty()));
    assert_eq!(rows[0][0], "first comment");
    assert_eq!(rows[1][0], "second comment");
}

#[tokio::test]
async fn test_total_remote_failure_still_aligns_row_counts() {
    let (_dir, config) = setup(FOUR_ROW_INPUT).await;

    let classifier = FakeClassifier::always_failing();

    let output_file = config.output_file.clone();
    let stats = App::with_classifier(config, classifier)
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.failed, 3);

    let (_, rows) = read_output(&output_file);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r[2] == ERROR_LABEL));
}

#[tokio::test]
async fn test_second_run_with_complete_checkpoint_is_noop() {
    let (_dir, config) = setup(FOUR_ROW_INPUT).await;

    let classifier = FakeClassifier::new(vec![Ok(r#"[
        {"comment":"great product","score":0.8,"sentiment":"Positive"},
        {"comment":"terrible service","score":-0.6,"sentiment":"Negative"},
        {"comment":"it's fine","score":0.0,"sentiment":"Neutral"}
    ]"#
    .to_string())]);

    let output_file = config.output_file.clone();
    App::with_classifier(config.clone(), classifier)
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    let before = std::fs::read_to_string(&output_file).unwrap();

    // 第二次运行：检查点已覆盖全部输入，不应发起任何远程调用
    let second = FakeClassifier::always_failing();
    let app = App::with_classifier(config, second).await.unwrap();
    let stats = app.run().await.unwrap();

    assert_eq!(stats.processed, 0);
    assert_eq!(stats.total, 3);

    let after = std::fs::read_to_string(&output_file).unwrap();
    assert_eq!(before, after, "幂等运行不应改动输出");
}

#[tokio::test]
async fn test_resume_from_whole_batch_checkpoint() {
    let input = "comment_text\none\ntwo\nthree\nfour\n";
    let (_dir, mut config) = setup(input).await;
    config.batch_size = 2;

    // 预置一个完整批次（k = 1，批大小 2）的检查点
    tokio::fs::write(
        &config.output_file,
        "comment,score,sentiment\none,0.5,Positive\ntwo,-0.5,Negative\n",
    )
    .await
    .unwrap();

    let classifier = FakeClassifier::new(vec![Ok(r#"[
        {"comment":"three","score":0.1,"sentiment":"Neutral"},
        {"comment":"four","score":0.2,"sentiment":"Neutral"}
    ]"#
    .to_string())]);

    let output_file = config.output_file.clone();
    let app = App::with_classifier(config, classifier).await.unwrap();
    let stats = app.run().await.unwrap();

    // 恰好从 k * batch_size = 2 继续，只处理剩下的一批
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.total, 4);

    let (_, rows) = read_output(&output_file);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "one");
    assert_eq!(rows[2][0], "three");
    assert_eq!(rows[3][0], "four");
}

#[tokio::test]
async fn test_resumed_prompt_only_contains_unprocessed_comments() {
    let input = "comment_text\none\ntwo\nthree\nfour\n";
    let (_dir, mut config) = setup(input).await;
    config.batch_size = 2;

    tokio::fs::write(
        &config.output_file,
        "comment,score,sentiment\none,0.5,Positive\ntwo,-0.5,Negative\n",
    )
    .await
    .unwrap();

    let classifier = FakeClassifier::new(vec![Ok(r#"[
        {"comment":"three","score":0.1,"sentiment":"Neutral"},
        {"comment":"four","score":0.2,"sentiment":"Neutral"}
    ]"#
    .to_string())]);

    let classifier = std::sync::Arc::new(classifier);
    let app = App::with_classifier(config, classifier.clone())
        .await
        .unwrap();
    let stats = app.run().await.unwrap();
    assert_eq!(stats.processed, 2);

    // 已处理的前缀不会被重新发送
    assert_eq!(classifier.call_count(), 1);
    let prompts = classifier.prompts();
    assert!(prompts[0].contains("\"three\""));
    assert!(prompts[0].contains("\"four\""));
    assert!(!prompts[0].contains("\"one\""));
    assert!(!prompts[0].contains("\"two\""));
}

#[tokio::test]
async fn test_multiple_batches_call_remote_once_per_batch() {
    let input = "comment_text\na\nb\nc\nd\ne\n";
    let (_dir, mut config) = setup(input).await;
    config.batch_size = 2;

    let classifier = FakeClassifier::new(vec![
        Ok(r#"[{"comment":"a","score":0.1,"sentiment":"Neutral"},
               {"comment":"b","score":0.1,"sentiment":"Neutral"}]"#
            .to_string()),
        Ok(r#"[{"comment":"c","score":0.1,"sentiment":"Neutral"},
               {"comment":"d","score":0.1,"sentiment":"Neutral"}]"#
            .to_string()),
        Ok(r#"[{"comment":"e","score":0.1,"sentiment":"Neutral"}]"#.to_string()),
    ]);

    let output_file = config.output_file.clone();
    let stats = App::with_classifier(config, classifier)
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.processed, 5);
    let (_, rows) = read_output(&output_file);
    assert_eq!(rows.len(), 5);
    // 最后一批是截断的短窗口
    assert_eq!(rows[4][0], "e");
}

#[tokio::test]
async fn test_failed_batch_does_not_stop_following_batches() {
    let input = "comment_text\na\nb\nc\nd\n";
    let (_dir, mut config) = setup(input).await;
    config.batch_size = 2;

    let classifier = FakeClassifier::new(vec![
        Ok("nonsense prose, not json".to_string()),
        Ok(r#"[{"comment":"c","score":0.3,"sentiment":"Positive"},
               {"comment":"d","score":0.4,"sentiment":"Positive"}]"#
            .to_string()),
    ]);

    let output_file = config.output_file.clone();
    let stats = App::with_classifier(config, classifier)
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.processed, 4);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.ok, 2);

    let (_, rows) = read_output(&output_file);
    assert_eq!(rows[0][2], PARSE_ERROR_LABEL);
    assert_eq!(rows[1][2], PARSE_ERROR_LABEL);
    assert_eq!(rows[2][2], "Positive");
    assert_eq!(rows[3][2], "Positive");
}

#[tokio::test]
async fn test_corrupt_checkpoint_is_fatal_before_running() {
    let (_dir, config) = setup(FOUR_ROW_INPUT).await;

    // 字段数不一致的损坏检查点
    tokio::fs::write(
        &config.output_file,
        "comment,score,sentiment\na,0.5\nb,0.1,Neutral,extra\n",
    )
    .await
    .unwrap();

    let classifier = FakeClassifier::always_failing();
    let err = App::with_classifier(config, classifier).await.unwrap_err();

    assert!(err.to_string().contains("检查点"));
}

#[tokio::test]
async fn test_missing_input_file_is_fatal() {
    let (_dir, mut config) = setup("comment_text\nx\n").await;
    config.input_file = "/no/such/input.csv".to_string();

    let classifier = FakeClassifier::always_failing();
    let err = App::with_classifier(config, classifier).await.unwrap_err();

    assert!(err.to_string().contains("文件不存在"));
}

#[tokio::test]
async fn test_two_stage_output_schema_and_local_columns() {
    let (_dir, mut config) = setup("comment_text\ngreat product\nterrible service\n").await;
    config.two_stage = true;

    let classifier = FakeClassifier::new(vec![Ok(r#"[
        {"comment":"great product","score":0.9,"sentiment":"Positive"},
        {"comment":"terrible service","score":-0.8,"sentiment":"Negative"}
    ]"#
    .to_string())]);

    let output_file = config.output_file.clone();
    let stats = App::with_classifier(config, classifier)
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.processed, 2);

    let (headers, rows) = read_output(&output_file);
    assert_eq!(
        headers,
        vec!["comment", "local_polarity", "local_sentiment", "refined_sentiment"]
    );
    assert_eq!(rows.len(), 2);
    // 本地预打分与远程精分类同时出现在结果里
    assert_eq!(rows[0][2], "Positive");
    assert_eq!(rows[0][3], "Positive");
    assert_eq!(rows[1][2], "Negative");
    assert_eq!(rows[1][3], "Negative");
    assert!(!rows[0][1].is_empty());
}

#[tokio::test]
async fn test_prompt_contains_numbered_comments() {
    let (_dir, config) = setup("comment_text\nalpha\nbeta\n").await;

    let classifier = FakeClassifier::new(vec![Ok(r#"[
        {"comment":"alpha","score":0.1,"sentiment":"Neutral"},
        {"comment":"beta","score":0.1,"sentiment":"Neutral"}
    ]"#
    .to_string())]);

    // 提示词断言需要在 run 之后访问假分类器，这里借助 Arc 共享
    let classifier = std::sync::Arc::new(classifier);
    let app = App::with_classifier(config, classifier.clone()).await.unwrap();
    app.run().await.unwrap();

    let prompts = classifier.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("1. \"alpha\""));
    assert!(prompts[0].contains("2. \"beta\""));
    assert!(prompts[0].contains("Return JSON format"));
}
