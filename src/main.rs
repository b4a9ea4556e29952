//! make-doc 命令行入口

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use make_doc::cli::{self, Cli};

/// 在 Windows 上设置控制台代码页为 UTF-8
#[cfg(windows)]
fn setup_console_encoding() {
    unsafe {
        // 设置控制台输出代码页为 UTF-8 (65001)
        extern "system" {
            fn SetConsoleOutputCP(code_page: u32) -> i32;
            fn SetConsoleCP(code_page: u32) -> i32;
        }
        SetConsoleOutputCP(65001);
        SetConsoleCP(65001);
    }
}

#[cfg(not(windows))]
fn setup_console_encoding() {}

#[tokio::main]
async fn main() -> ExitCode {
    setup_console_encoding();

    // 工作目录下的 .env 先于参数解析加载
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 日志写到 stderr，stdout 只留给结果摘要
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "make_doc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli::run(cli).await {
        Ok(report) => {
            info!("Documentation written to {}", report.index_path.display());
            println!(
                "{} generated, {} skipped. Index: {}",
                report.generated.len(),
                report.skipped.len(),
                report.index_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{} : {}", e.kind(), e);
            eprintln!("Error: {}", e);
            ExitCode::from(&e)
        }
    }
}
