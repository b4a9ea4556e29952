//! LLM 请求日志记录器
//!
//! 把每一次 LLM 调用尝试记录到 JSONL 文件，便于排查失败的声明块。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

use super::{mask_api_key, truncate};
use crate::llm::LlmError;

/// 日志文件名
pub const REQUEST_LOG_FILE: &str = "llm_requests.jsonl";

/// 请求日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// 请求 ID
    pub request_id: String,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
    /// 端点 URL
    pub endpoint: String,
    /// API 密钥（脱敏）
    pub api_key_masked: String,
    /// 模型名称
    pub model: String,
    /// 源文件相对路径
    pub source_path: String,
    /// 声明名称
    pub symbol: String,
    /// 第几次尝试（从 1 开始）
    pub attempt: u32,
    /// 消息数量
    pub messages_count: usize,
    /// 状态
    pub status: String,
    /// 持续时间（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// 响应长度（字符）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_length: Option<usize>,
    /// 响应预览
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
    /// 错误类型
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// HTTP 状态码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// 一次请求的上下文
pub struct RequestContext<'a> {
    pub endpoint: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub source_path: &'a str,
    pub symbol: &'a str,
    pub attempt: u32,
    pub messages_count: usize,
}

/// 请求日志记录器
pub struct RequestLogger {
    log_path: PathBuf,
    max_entries: usize,
    file: Mutex<Option<File>>,
}

impl RequestLogger {
    /// 创建新的日志记录器，日志写入 `log_dir/llm_requests.jsonl`
    pub fn new(log_dir: &Path) -> Self {
        if let Err(e) = fs::create_dir_all(log_dir) {
            warn!("Failed to create request log dir {}: {}", log_dir.display(), e);
        }

        Self {
            log_path: log_dir.join(REQUEST_LOG_FILE),
            max_entries: 1000,
            file: Mutex::new(None),
        }
    }

    /// 设置保留的最大条目数
    #[cfg(test)]
    fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// 日志文件路径
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// 生成请求 ID
    pub fn generate_request_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    /// 记录请求开始
    pub fn begin(&self, ctx: RequestContext<'_>) -> LogEntry {
        LogEntry {
            request_id: Self::generate_request_id(),
            timestamp: Utc::now(),
            endpoint: ctx.endpoint.to_string(),
            api_key_masked: mask_api_key(ctx.api_key),
            model: ctx.model.to_string(),
            source_path: ctx.source_path.to_string(),
            symbol: ctx.symbol.to_string(),
            attempt: ctx.attempt,
            messages_count: ctx.messages_count,
            status: "pending".to_string(),
            duration_ms: None,
            response_length: None,
            response_preview: None,
            error_type: None,
            error_message: None,
            status_code: None,
        }
    }

    /// 记录成功
    pub fn log_success(&self, mut entry: LogEntry, start_time: Instant, response: &str) {
        entry.status = "success".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.response_length = Some(response.chars().count());
        entry.response_preview = Some(truncate(response, 300));
        self.write_entry(&entry);
    }

    /// 记录错误
    pub fn log_error(&self, mut entry: LogEntry, start_time: Instant, error: &LlmError) {
        entry.status = "error".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.error_type = Some(error.kind().to_string());
        entry.error_message = Some(truncate(&error.to_string(), 500));
        entry.status_code = error.status();
        self.write_entry(&entry);
    }

    /// 写入日志条目，失败只记录警告
    fn write_entry(&self, entry: &LogEntry) {
        let mut file_guard = self.file.lock();

        // 懒加载文件
        if file_guard.is_none() {
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)
            {
                Ok(f) => *file_guard = Some(f),
                Err(e) => {
                    warn!("Failed to open request log {}: {}", self.log_path.display(), e);
                    return;
                }
            }
        }

        if let Some(file) = file_guard.as_mut() {
            if let Ok(json) = serde_json::to_string(entry) {
                let _ = writeln!(file, "{}", json);
                let _ = file.flush();
            }
        }

        self.cleanup_if_needed();
    }

    /// 只保留最近的 max_entries 条
    ///
    /// 调用方持有文件锁
    fn cleanup_if_needed(&self) {
        let Ok(file) = File::open(&self.log_path) else {
            return;
        };
        let lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();

        if lines.len() > self.max_entries {
            let keep_lines = &lines[lines.len() - self.max_entries..];
            if let Ok(mut file) = File::create(&self.log_path) {
                for line in keep_lines {
                    let _ = writeln!(file, "{}", line);
                }
            }
        }
    }
}
