//! 文档生成器模块
//!
//! 扫描 C/C++ 头文件，调用 LLM 为每个声明生成说明，输出 VitePress 站点所需的 markdown
//!
//! # 功能
//!
//! - 扫描输入目录，提取函数与结构体声明
//! - 每个声明一次 LLM 请求，文件内有界并发，失败按策略重试
//! - 保持输入目录层级写出文档，已存在的文档默认跳过
//! - 生成 index.md 与 `.vitepress/sidebar.json`
//!
//! # 使用示例
//!
//! ```ignore
//! use std::sync::Arc;
//! use make_doc::config::MakeDocConfig;
//! use make_doc::llm::LlmClient;
//! use make_doc::services::doc_generator::{DocPipeline, RunOptions};
//!
//! let config = MakeDocConfig::default().with_credentials_from_env()?;
//! let client = Arc::new(LlmClient::new(&config)?);
//! let pipeline = DocPipeline::new(&config, client);
//!
//! let report = pipeline.run(&RunOptions {
//!     input_dir: "sdk/include".into(),
//!     output_dir: "docs".into(),
//!     force: false,
//!     keep_going: false,
//! }).await?;
//! ```

mod extractor;
mod generator;
pub mod index;
mod processor;
pub mod prompts;
mod scanner;
pub mod types;
mod writer;

pub use extractor::extract_blocks;
pub use generator::DocumentGenerator;
pub use processor::{DocPipeline, RunOptions, RunReport};
pub use scanner::{ScanError, SourceScanner};
pub use types::{BlockKind, CodeBlock, DocRequest, DocResult, NavEntry, SourceUnit};
pub use writer::{MarkdownWriter, WriterError};
