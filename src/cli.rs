//! 命令行参数与入口逻辑

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::MakeDocConfig;
use crate::error::AppResult;
use crate::llm::LlmClient;
use crate::services::doc_generator::{DocPipeline, RunOptions, RunReport};

/// 从 C/C++ 头文件生成 VitePress 文档
#[derive(Parser, Debug)]
#[command(
    name = "make-doc",
    version,
    about = "Generate VitePress markdown docs for C/C++ headers with an OpenAI-compatible LLM",
    after_help = "Environment:\n  MAKE_DOC_API_TOKEN  API token (required)\n  MAKE_DOC_API_URL    OpenAI-compatible base URL (required)"
)]
pub struct Cli {
    /// Directory containing the header files
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory the VitePress docs are written to
    #[arg(long)]
    pub output_dir: PathBuf,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Model name sent to the API
    #[arg(long)]
    pub model: Option<String>,

    /// Target language of the generated docs
    #[arg(long)]
    pub language: Option<String>,

    /// Concurrent requests per file (1-32)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Attempts per declaration before giving up
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Glob pattern to skip (name or relative path). Can be repeated.
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Regenerate docs that already exist
    #[arg(long)]
    pub force: bool,

    /// Continue with the next file when a file fails, exit non-zero at the end
    #[arg(long)]
    pub keep_going: bool,

    /// Directory for the JSONL request log
    #[arg(long)]
    pub request_log: Option<PathBuf>,
}

impl Cli {
    /// 组装配置：默认值 < 配置文件 < 命令行参数，密钥只来自环境变量
    pub fn load_config(&self) -> AppResult<MakeDocConfig> {
        let mut config = match &self.config {
            Some(path) => MakeDocConfig::from_file(path)?,
            None => MakeDocConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        config.exclude.extend(self.exclude.iter().cloned());
        if let Some(dir) = &self.request_log {
            config.request_log_dir = Some(dir.clone());
        }

        let config = config.with_credentials_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            force: self.force,
            keep_going: self.keep_going,
        }
    }
}

/// 执行一次生成，供 main 与集成测试共用
pub async fn run(cli: Cli) -> AppResult<RunReport> {
    let config = cli.load_config()?;
    info!("Using config: {:?}", config);

    let client = Arc::new(LlmClient::new(&config)?);
    let pipeline = DocPipeline::new(&config, client);
    pipeline.run(&cli.run_options()).await
}
