//! LLM 服务 - 业务能力层
//!
//! 只负责"远程情感分类"能力，不关心批次循环和持久化
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::record::{Comment, LocalScore};

/// 远程分类调用的抽象
///
/// 远程客户端作为显式传入的依赖存在，测试中可以替换为
/// 模拟瞬时失败和畸形响应的假实现
pub trait RemoteClassifier {
    /// 发送一批评论的分类提示词，返回原始响应文本
    fn classify(&self, prompt: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 对一批评论做情感分类
/// - 构建批次提示词（分类规则 + 输出格式 + 带编号的评论列表）
/// - 不出现重试逻辑，不出现检查点
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.2)
            .build()?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

impl RemoteClassifier for LlmService {
    async fn classify(&self, prompt: &str) -> Result<String> {
        self.send_to_llm(prompt, Some(SYSTEM_MESSAGE)).await
    }
}

// 共享句柄同样可以作为分类器注入，测试中常用 Arc 保留对假实现的访问
impl<C: RemoteClassifier + Send + Sync> RemoteClassifier for std::sync::Arc<C> {
    fn classify(&self, prompt: &str) -> impl std::future::Future<Output = Result<String>> + Send {
        self.as_ref().classify(prompt)
    }
}

/// 系统消息：约束模型只输出 JSON
const SYSTEM_MESSAGE: &str =
    "You are a sentiment classification assistant. Always respond with the exact \
     JSON array format requested, with one object per input comment in the same \
     order. Do not add any explanation outside the JSON.";

/// 构建一个批次的分类提示词
///
/// 提示词包含三部分：分类规则、要求的输出格式、带 1-based 编号的评论列表。
/// 两阶段模式下每条评论附带本地词典预打分作为参考。
pub fn build_batch_prompt(comments: &[Comment], local_scores: Option<&[LocalScore]>) -> String {
    let mut prompt = String::from(
        "Analyze the sentiment of the following comments. For each, return a \
         sentiment score (-1 to 1) and a sentiment label using these rules:\n\
         - Positive if score > 0.2\n\
         - Negative if score < -0.2\n\
         - Neutral otherwise\n\n\
         Return JSON format: [{\"comment\": \"...\", \"score\": ..., \"sentiment\": \"...\"}]\n\n\
         Comments:\n",
    );

    for (i, comment) in comments.iter().enumerate() {
        match local_scores.and_then(|scores| scores.get(i)) {
            Some(local) => {
                prompt.push_str(&format!(
                    "{}. \"{}\" (lexicon pre-score: {:.2}, {})\n",
                    i + 1,
                    comment.text,
                    local.polarity,
                    local.label
                ));
            }
            None => {
                prompt.push_str(&format!("{}. \"{}\"\n", i + 1, comment.text));
            }
        }
    }

    prompt
}
