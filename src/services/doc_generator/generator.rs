//! 文档生成器
//!
//! 负责把一个源文件的所有声明块发给 LLM，并按源码顺序组装成文档

use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use super::prompts::build_doc_request;
use super::types::{DocRequest, DocResult, SourceUnit};
use crate::config::MakeDocConfig;
use crate::llm::{chat_completions_endpoint, ChatBackend, LlmError};
use crate::utils::request_logger::RequestContext;
use crate::utils::RequestLogger;

/// 并发上限
const MAX_CONCURRENCY: usize = 32;

/// 文档生成器
pub struct DocumentGenerator {
    backend: Arc<dyn ChatBackend>,
    /// 目标语言
    language: String,
    /// 单个文件内的并发请求数
    concurrency: usize,
    /// 每个声明块最多尝试次数
    max_attempts: u32,
    /// 重试间隔
    retry_delay: Duration,
    /// 请求日志（可选）
    request_logger: Option<Arc<RequestLogger>>,
    /// 写入请求日志的端点、密钥与模型
    endpoint: String,
    api_key: String,
    model: String,
}

impl DocumentGenerator {
    /// 创建新的文档生成器
    pub fn new(backend: Arc<dyn ChatBackend>, config: &MakeDocConfig) -> Self {
        Self {
            backend,
            language: config.language.clone(),
            concurrency: config.concurrency.clamp(1, MAX_CONCURRENCY),
            max_attempts: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            request_logger: None,
            endpoint: chat_completions_endpoint(&config.api_url),
            api_key: config.api_token.clone(),
            model: config.model.clone(),
        }
    }

    /// 启用请求日志
    pub fn with_request_logger(mut self, logger: Arc<RequestLogger>) -> Self {
        self.request_logger = Some(logger);
        self
    }

    /// 构建一个文件的全部请求
    pub fn build_requests<'a>(&self, unit: &'a SourceUnit) -> Vec<DocRequest<'a>> {
        unit.blocks
            .iter()
            .map(|block| build_doc_request(unit, block, &self.language))
            .collect()
    }

    /// 为一个源文件生成文档
    ///
    /// 任一声明块最终失败时返回错误，其余未完成的请求被丢弃
    pub async fn generate(
        &self,
        unit: &SourceUnit,
        output_path: PathBuf,
    ) -> Result<DocResult, LlmError> {
        let requests = self.build_requests(unit);
        let total = requests.len();

        let docs: Vec<String> = stream::iter(requests.iter().enumerate())
            .map(|(index, request)| async move {
                let doc = self.request_with_retry(request).await?;
                debug!(
                    "Processing file: {}, block {} of {} completed",
                    unit.relative_path,
                    index + 1,
                    total
                );
                Ok::<_, LlmError>(doc)
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut markdown = String::new();
        for doc in &docs {
            markdown.push_str(doc);
            markdown.push_str("\n\n");
        }

        Ok(DocResult {
            output_path,
            markdown,
        })
    }

    /// 发送单个请求，失败时按策略重试
    async fn request_with_retry(&self, request: &DocRequest<'_>) -> Result<String, LlmError> {
        let mut attempt = 1;
        loop {
            let log_entry = self.request_logger.as_ref().map(|logger| {
                logger.begin(RequestContext {
                    endpoint: &self.endpoint,
                    api_key: &self.api_key,
                    model: &self.model,
                    source_path: &request.unit.relative_path,
                    symbol: &request.block.name,
                    attempt,
                    messages_count: request.messages.len(),
                })
            });
            let start = Instant::now();

            let result = self.backend.complete(request.messages.clone()).await;

            if let (Some(logger), Some(entry)) = (&self.request_logger, log_entry) {
                match &result {
                    Ok(text) => logger.log_success(entry, start, text),
                    Err(e) => logger.log_error(entry, start, e),
                }
            }

            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        "Error processing {} `{}` (attempt {}/{}): {}",
                        request.unit.relative_path, request.block.name, attempt, self.max_attempts, e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Request failed for {} `{}` after {} attempt(s): {}",
                        request.unit.relative_path, request.block.name, attempt, e
                    );
                    return Err(e);
                }
            }
        }
    }
}
