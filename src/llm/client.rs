//! LLM 客户端

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::openai::{chat_completions_endpoint, chat_openai};
use super::types::{ChatMessage, ChatOptions, LlmError};
use crate::config::MakeDocConfig;

/// 聊天后端
///
/// 文档生成器只依赖这个 trait，测试中可以替换为 mock
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// 发送消息并返回完整回复文本
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}

/// OpenAI 兼容 LLM 客户端
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    options: ChatOptions,
}

impl LlmClient {
    /// 根据配置创建客户端
    pub fn new(config: &MakeDocConfig) -> Result<Self, LlmError> {
        if config.api_token.is_empty() {
            return Err(LlmError::ConfigError("API token is required".to_string()));
        }
        if config.api_url.is_empty() {
            return Err(LlmError::ConfigError("API URL is required".to_string()));
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(30)))
            .pool_max_idle_per_host(config.concurrency)
            .build()
            .map_err(LlmError::from_transport)?;

        let endpoint = chat_completions_endpoint(&config.api_url);
        info!("LLM client ready: endpoint={}, model={}", endpoint, config.model);

        Ok(Self {
            client,
            api_key: config.api_token.clone(),
            endpoint,
            model: config.model.clone(),
            options: ChatOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        })
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        chat_openai(
            &self.client,
            &self.api_key,
            &self.endpoint,
            &self.model,
            &messages,
            &self.options,
        )
        .await
    }
}
