//! 应用配置管理
//!
//! 提供配置的加载与校验。可选的 JSON 配置文件只包含非敏感字段，
//! API token 和 URL 只从环境变量读取。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::mask_api_key;

/// API token 环境变量
pub const ENV_API_TOKEN: &str = "MAKE_DOC_API_TOKEN";

/// OpenAI 兼容 API 基础 URL 环境变量
pub const ENV_API_URL: &str = "MAKE_DOC_API_URL";

/// 应用配置结构体
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MakeDocConfig {
    /// LLM API token（来自 MAKE_DOC_API_TOKEN）
    #[serde(skip)]
    pub api_token: String,

    /// LLM API 基础 URL（来自 MAKE_DOC_API_URL）
    #[serde(skip)]
    pub api_url: String,

    /// 模型名称
    #[serde(default = "default_model")]
    pub model: String,

    /// 文档目标语言
    #[serde(default = "default_language")]
    pub language: String,

    /// 温度参数 (0.0 - 2.0)，不设置时使用服务端默认值
    #[serde(default)]
    pub temperature: Option<f64>,

    /// 最大 token 数
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// 单次请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 单个文件内并发请求数
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// 每个声明块最多尝试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 重试间隔（毫秒）
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// 识别为头文件的扩展名（不含点）
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 忽略的 glob 模式
    #[serde(default)]
    pub exclude: Vec<String>,

    /// LLM 请求日志目录，不设置则不记录
    #[serde(default)]
    pub request_log_dir: Option<PathBuf>,
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_language() -> String {
    "中文".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_concurrency() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_extensions() -> Vec<String> {
    vec!["h".to_string(), "hpp".to_string()]
}

impl Default for MakeDocConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_url: String::new(),
            model: default_model(),
            language: default_language(),
            temperature: None,
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            extensions: default_extensions(),
            exclude: Vec::new(),
            request_log_dir: None,
        }
    }
}

impl fmt::Debug for MakeDocConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MakeDocConfig")
            .field("api_token", &mask_api_key(&self.api_token))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("language", &self.language)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("extensions", &self.extensions)
            .field("exclude", &self.exclude)
            .field("request_log_dir", &self.request_log_dir)
            .finish()
    }
}

impl MakeDocConfig {
    /// 从 JSON 配置文件加载，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// 从进程环境变量读取 API token 和 URL
    pub fn with_credentials_from_env(self) -> Result<Self, ConfigError> {
        self.with_credentials_from(|key| std::env::var(key).ok())
    }

    /// 通过查找函数读取 API token 和 URL
    ///
    /// token 缺失时立即失败，保证在任何网络请求之前报错
    pub fn with_credentials_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_API_TOKEN)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnv(ENV_API_TOKEN))?;

        let url = lookup(ENV_API_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnv(ENV_API_URL))?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnv {
                name: ENV_API_URL,
                reason: format!("'{}' 不是 http(s) URL", url),
            });
        }

        self.api_token = token;
        self.api_url = url;
        Ok(self)
    }

    /// 校验非敏感字段
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model 不能为空".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency 必须大于 0".to_string()));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries 必须大于 0".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs 必须大于 0".to_string()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid("extensions 不能为空".to_string()));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "temperature 必须在 0.0 - 2.0 之间，当前为 {}",
                    t
                )));
            }
        }
        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("缺少环境变量 {0}")]
    MissingEnv(&'static str),

    #[error("环境变量 {name} 无效: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    #[error("读取配置文件失败 ({0}): {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("解析配置文件失败 ({0}): {1}")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}
