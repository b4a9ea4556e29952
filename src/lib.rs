//! make-doc
//!
//! 扫描 C/C++ 头文件，调用 OpenAI 兼容的 LLM 接口为每个声明生成说明，
//! 输出可直接用于 VitePress 的 markdown 文档、索引页和侧边栏配置。

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod services;
pub mod utils;

pub use error::{AppError, AppResult};
