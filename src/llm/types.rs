//! LLM 类型定义

use serde::{Deserialize, Serialize};

/// 聊天消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 角色：system, user, assistant
    pub role: String,
    /// 消息内容
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 聊天选项
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// 温度参数
    pub temperature: Option<f64>,
    /// 最大 token 数
    pub max_tokens: Option<u32>,
}

/// LLM 错误类型
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// 网络传输错误（连接失败、读取响应失败等）
    #[error("HTTP 请求失败: {0}")]
    HttpError(reqwest::Error),

    /// API 返回非成功状态码
    #[error("API 错误 ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// 超时错误
    #[error("请求超时")]
    Timeout,

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// JSON 解析错误
    #[error("JSON 解析失败: {0}")]
    JsonError(#[from] serde_json::Error),

    /// 响应结构不符合预期（例如没有 choices）
    #[error("响应无效: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// 从 reqwest 错误转换，区分超时
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::HttpError(err)
        }
    }

    /// 是否值得重试
    ///
    /// 超时、网络错误、408/429/5xx 重试；其余 4xx、解析错误和配置错误不重试
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout | LlmError::HttpError(_) => true,
            LlmError::ApiError { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            LlmError::ConfigError(_) | LlmError::JsonError(_) | LlmError::InvalidResponse(_) => {
                false
            }
        }
    }

    /// 错误类别（用于请求日志）
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::HttpError(_) => "http",
            LlmError::ApiError { .. } => "api",
            LlmError::Timeout => "timeout",
            LlmError::ConfigError(_) => "config",
            LlmError::JsonError(_) => "json",
            LlmError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// HTTP 状态码（仅 API 错误有）
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
