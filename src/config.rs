/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 输入 CSV 文件路径
    pub input_file: String,
    /// 输出（检查点）CSV 文件路径
    pub output_file: String,
    /// 输入文件中的评论文本列名
    pub text_column: String,
    /// 每批处理的评论数量
    pub batch_size: usize,
    /// 远程调用的最大重试次数
    pub max_retries: usize,
    /// 批次之间的固定停顿（毫秒），用于控制请求频率
    pub batch_pause_ms: u64,
    /// 退避基础等待（毫秒）
    pub backoff_base_ms: u64,
    /// 退避每次递增（毫秒）
    pub backoff_step_ms: u64,
    /// 退避随机抖动上限（毫秒）
    pub backoff_jitter_ms: u64,
    /// 是否启用两阶段模式（本地词典预打分 + 远程精分类）
    pub two_stage: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: "comments_file.csv".to_string(),
            output_file: "classified_sentiments.csv".to_string(),
            text_column: "comment_text".to_string(),
            batch_size: 25,
            max_retries: 3,
            batch_pause_ms: 1000,
            backoff_base_ms: 10_000,
            backoff_step_ms: 5_000,
            backoff_jitter_ms: 5_000,
            two_stage: false,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_file: std::env::var("INPUT_FILE").unwrap_or(default.input_file),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            text_column: std::env::var("TEXT_COLUMN").unwrap_or(default.text_column),
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.batch_size),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_retries),
            batch_pause_ms: std::env::var("BATCH_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.batch_pause_ms),
            backoff_base_ms: std::env::var("BACKOFF_BASE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_base_ms),
            backoff_step_ms: std::env::var("BACKOFF_STEP_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_step_ms),
            backoff_jitter_ms: std::env::var("BACKOFF_JITTER_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_jitter_ms),
            two_stage: std::env::var("TWO_STAGE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.two_stage),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
