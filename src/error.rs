//! 统一错误处理模块
//!
//! 定义应用级错误类型。各模块有自己的错误枚举（扫描、写入、LLM、配置），
//! 在流水线层汇聚为 [`AppError`]，并映射为进程退出码。

use std::process::ExitCode;
use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;
use crate::services::doc_generator::{ScanError, WriterError};

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置相关错误（环境变量缺失、配置文件无效）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 输入目录扫描失败
    #[error("文件系统错误: {0}")]
    Scan(#[from] ScanError),

    /// 输出写入失败
    #[error("文件系统错误: {0}")]
    Write(#[from] WriterError),

    /// LLM 调用错误（API 非成功状态、超时、网络）
    #[error("LLM 错误: {0}")]
    Llm(#[from] LlmError),

    /// `--keep-going` 模式下部分文件失败
    #[error("{} 个文件生成失败: {}", .0.len(), .0.join(", "))]
    Partial(Vec<String>),
}

impl AppError {
    /// 错误类别名称，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "ConfigError",
            AppError::Scan(_) | AppError::Write(_) => "FileSystemError",
            AppError::Llm(LlmError::Timeout) => "TimeoutError",
            AppError::Llm(LlmError::ConfigError(_)) => "ConfigError",
            AppError::Llm(_) => "ApiError",
            AppError::Partial(_) => "PartialFailure",
        }
    }

    /// 进程退出码
    ///
    /// 2 配置，3 文件系统，4 API，5 超时，6 部分失败
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Llm(LlmError::ConfigError(_)) => 2,
            AppError::Scan(_) | AppError::Write(_) => 3,
            AppError::Llm(LlmError::Timeout) => 5,
            AppError::Llm(
                LlmError::HttpError(_)
                | LlmError::ApiError { .. }
                | LlmError::JsonError(_)
                | LlmError::InvalidResponse(_),
            ) => 4,
            AppError::Partial(_) => 6,
        }
    }
}

impl From<&AppError> for ExitCode {
    fn from(err: &AppError) -> Self {
        ExitCode::from(err.exit_code())
    }
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
