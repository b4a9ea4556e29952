//! LLM 模块
//!
//! 提供 OpenAI 兼容的非流式聊天客户端，以及文档生成器依赖的 [`ChatBackend`] 抽象。

mod client;
mod openai;
mod types;

#[cfg(test)]
pub use client::MockChatBackend;
pub use client::{ChatBackend, LlmClient};
pub use openai::chat_completions_endpoint;
pub use types::*;
