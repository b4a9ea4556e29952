//! OpenAI Chat Completions API（非流式）

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::types::{ChatMessage, ChatOptions, LlmError};
use crate::utils::truncate;

/// OpenAI 请求载荷
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// OpenAI 响应
#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize, Debug)]
struct OpenAiMessage {
    content: Option<String>,
}

/// 由基础 URL 得到 Chat Completions 端点
///
/// 与 OpenAI SDK 的 `base_url` 约定一致：在基础 URL 后追加 `/chat/completions`，
/// 已经是完整端点时原样返回。路径中的重复斜杠会被合并。
pub fn chat_completions_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim();
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, trimmed),
    };

    let path = rest
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let base = match scheme {
        Some(scheme) => format!("{}://{}", scheme, path),
        None => path,
    };

    if base.ends_with("/chat/completions") {
        base
    } else {
        format!("{}/chat/completions", base)
    }
}

/// 调用 OpenAI 兼容接口，返回第一条回复内容
pub async fn chat_openai(
    client: &Client,
    api_key: &str,
    endpoint: &str,
    model: &str,
    messages: &[ChatMessage],
    options: &ChatOptions,
) -> Result<String, LlmError> {
    let payload = OpenAiRequest {
        model,
        messages,
        stream: false,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };

    debug!(
        "OpenAI API request: endpoint={}, model={}, messages={}",
        endpoint,
        model,
        messages.len()
    );

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&payload)
        .send()
        .await
        .map_err(LlmError::from_transport)?;

    // 检查状态码
    let status = response.status();
    let body = response.text().await.map_err(LlmError::from_transport)?;
    if !status.is_success() {
        let status_code = status.as_u16();
        error!(
            "OpenAI API error: status={}, body={}",
            status_code,
            truncate(&body, 500)
        );
        return Err(LlmError::ApiError {
            status: status_code,
            message: body,
        });
    }

    let parsed: OpenAiResponse = serde_json::from_str(&body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("响应中没有 choices[0].message.content".to_string()))
}
