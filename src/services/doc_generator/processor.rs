//! 流水线调度
//!
//! 扫描 → 逐个文件生成并写入 → 输出索引页与侧边栏

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::generator::DocumentGenerator;
use super::index::{render_index_markdown, render_sidebar, sort_entries};
use super::scanner::SourceScanner;
use super::types::{NavEntry, SourceUnit, INDEX_FILE, SIDEBAR_FILE};
use super::writer::{MarkdownWriter, WriterError};
use crate::config::MakeDocConfig;
use crate::error::{AppError, AppResult};
use crate::llm::ChatBackend;
use crate::utils::RequestLogger;

/// 单次运行的参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 头文件输入目录
    pub input_dir: PathBuf,
    /// 文档输出目录
    pub output_dir: PathBuf,
    /// 重新生成已存在的文档
    pub force: bool,
    /// 单个文件 LLM 调用失败时继续处理其余文件
    pub keep_going: bool,
}

/// 运行结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 本次生成的文档（源文件相对路径）
    pub generated: Vec<String>,
    /// 已存在而跳过的文档
    pub skipped: Vec<String>,
    /// 生成失败的文件
    pub failed: Vec<String>,
    pub index_path: PathBuf,
    pub sidebar_path: PathBuf,
}

/// 文档生成流水线
pub struct DocPipeline {
    scanner: SourceScanner,
    generator: DocumentGenerator,
}

impl DocPipeline {
    /// 创建流水线，配置了请求日志目录时同时启用请求日志
    pub fn new(config: &MakeDocConfig, backend: Arc<dyn ChatBackend>) -> Self {
        let mut generator = DocumentGenerator::new(backend, config);
        if let Some(dir) = &config.request_log_dir {
            let logger = RequestLogger::new(dir);
            info!("Request log: {}", logger.log_path().display());
            generator = generator.with_request_logger(Arc::new(logger));
        }

        Self {
            scanner: SourceScanner::new(config),
            generator,
        }
    }

    /// 执行一次完整的生成
    pub async fn run(&self, options: &RunOptions) -> AppResult<RunReport> {
        // 先完整扫描，任何文件系统错误都在写入前暴露
        let units = self
            .scanner
            .scan(&options.input_dir)?
            .collect::<Result<Vec<SourceUnit>, _>>()?;
        info!(
            "Found {} header files in {}",
            units.len(),
            options.input_dir.display()
        );

        let writer = MarkdownWriter::new(&options.output_dir);
        writer.check_collisions(&units)?;
        writer.ensure_root().await?;

        let mut report = RunReport::default();
        let mut entries = Vec::with_capacity(units.len());
        let total = units.len();

        for (index, unit) in units.iter().enumerate() {
            if !options.force && writer.has_existing_doc(unit).await {
                info!("Skipping completed file: {}", unit.relative_path);
                report.skipped.push(unit.relative_path.clone());
                entries.push(NavEntry::from_unit(unit));
                continue;
            }

            info!(
                "Processing file {}/{}: {} ({} blocks)",
                index + 1,
                total,
                unit.relative_path,
                unit.blocks.len()
            );

            match self.generator.generate(unit, writer.doc_path(unit)).await {
                Ok(result) => {
                    let path = writer.write(&result).await?;
                    info!("Markdown file created at: {}", path.display());
                    report.generated.push(unit.relative_path.clone());
                    entries.push(NavEntry::from_unit(unit));
                }
                Err(e) if options.keep_going => {
                    warn!("Skipping {} after failure: {}", unit.relative_path, e);
                    report.failed.push(unit.relative_path.clone());
                }
                Err(e) => {
                    error!("Document generation failed for {}: {}", unit.relative_path, e);
                    return Err(e.into());
                }
            }
        }

        sort_entries(&mut entries);
        report.index_path = writer
            .write_file(INDEX_FILE, &render_index_markdown(&entries))
            .await?;
        info!("Index file created at: {}", report.index_path.display());

        let sidebar = render_sidebar(&entries).map_err(|e| {
            WriterError::IoError(writer.output_root().join(SIDEBAR_FILE), e.into())
        })?;
        report.sidebar_path = writer.write_file(SIDEBAR_FILE, &sidebar).await?;
        info!("Sidebar config created at: {}", report.sidebar_path.display());

        info!(
            "Done: {} generated, {} skipped, {} failed",
            report.generated.len(),
            report.skipped.len(),
            report.failed.len()
        );

        if !report.failed.is_empty() {
            return Err(AppError::Partial(report.failed));
        }
        Ok(report)
    }
}
