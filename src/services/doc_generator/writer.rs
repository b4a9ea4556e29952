//! Markdown 写入
//!
//! 把生成的文档写入输出目录，保持与输入目录相同的层级

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::types::{DocResult, SourceUnit};

/// Markdown 写入器
pub struct MarkdownWriter {
    /// 输出根目录
    output_root: PathBuf,
}

impl MarkdownWriter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// 源文件对应的文档路径
    pub fn doc_path(&self, unit: &SourceUnit) -> PathBuf {
        self.output_root.join(unit.doc_relative_path())
    }

    /// 检查多个源文件是否会写到同一个文档
    ///
    /// 例如同一目录下的 `a.h` 和 `a.hpp`
    pub fn check_collisions(&self, units: &[SourceUnit]) -> Result<(), WriterError> {
        let mut seen: HashMap<PathBuf, &str> = HashMap::new();
        for unit in units {
            let target = self.doc_path(unit);
            if let Some(first) = seen.get(&target) {
                return Err(WriterError::OutputCollision {
                    target,
                    first: first.to_string(),
                    second: unit.relative_path.clone(),
                });
            }
            seen.insert(target, &unit.relative_path);
        }
        Ok(())
    }

    /// 确保输出根目录存在
    pub async fn ensure_root(&self) -> Result<(), WriterError> {
        fs::create_dir_all(&self.output_root)
            .await
            .map_err(|e| WriterError::IoError(self.output_root.clone(), e))
    }

    /// 文档是否已存在且非空
    pub async fn has_existing_doc(&self, unit: &SourceUnit) -> bool {
        match fs::metadata(self.doc_path(unit)).await {
            Ok(meta) => meta.is_file() && meta.len() > 0,
            Err(_) => false,
        }
    }

    /// 写入一个文档，覆盖已有内容
    pub async fn write(&self, result: &DocResult) -> Result<PathBuf, WriterError> {
        write_with_parents(&result.output_path, &result.markdown).await?;
        debug!("Document saved: {}", result.output_path.display());
        Ok(result.output_path.clone())
    }

    /// 写入输出目录下的任意文件（索引、侧边栏）
    pub async fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf, WriterError> {
        let path = self.output_root.join(relative);
        write_with_parents(&path, content).await?;
        debug!("File saved: {}", path.display());
        Ok(path)
    }
}

async fn write_with_parents(path: &Path, content: &str) -> Result<(), WriterError> {
    // 确保父目录存在
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| WriterError::IoError(parent.to_path_buf(), e))?;
    }

    fs::write(path, content)
        .await
        .map_err(|e| WriterError::IoError(path.to_path_buf(), e))
}

/// 写入错误类型
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("IO错误 ({0}): {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("输出路径冲突: {first} 和 {second} 都会写入 {target}")]
    OutputCollision {
        target: PathBuf,
        first: String,
        second: String,
    },
}
