//! 命令行行为：参数、环境变量与退出码

mod common;

use assert_cmd::Command;
use common::{create_input_dir, list_docs, StubServer};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// 干净环境下的命令，工作目录设为临时目录避免读到仓库里的 .env
fn make_doc(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("make-doc").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("MAKE_DOC_API_TOKEN")
        .env_remove("MAKE_DOC_API_URL")
        .env("RUST_LOG", "make_doc=warn");
    cmd
}

#[test]
fn missing_required_args_is_usage_error() {
    let workdir = TempDir::new().unwrap();
    make_doc(&workdir)
        .arg("--input-dir")
        .arg("include")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--output-dir"));
}

#[test]
fn missing_token_fails_before_scanning() {
    let workdir = TempDir::new().unwrap();
    let input = create_input_dir();
    let output = workdir.path().join("site");

    make_doc(&workdir)
        .env("MAKE_DOC_API_URL", "http://127.0.0.1:9/v1")
        .arg("--input-dir")
        .arg(input.path())
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MAKE_DOC_API_TOKEN"));

    assert!(!output.exists());
}

#[test]
fn token_from_dotenv_file_is_used() {
    let workdir = TempDir::new().unwrap();
    fs::write(
        workdir.path().join(".env"),
        "MAKE_DOC_API_TOKEN=sk-from-dotenv\nMAKE_DOC_API_URL=not-a-url\n",
    )
    .unwrap();

    // token 已由 .env 提供，URL 无效时报的是 URL 错误
    make_doc(&workdir)
        .arg("--input-dir")
        .arg("include")
        .arg("--output-dir")
        .arg("site")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MAKE_DOC_API_URL"));
}

#[test]
fn unknown_config_field_is_config_error() {
    let workdir = TempDir::new().unwrap();
    let config = workdir.path().join("make-doc.json");
    fs::write(&config, r#"{ "model": "gpt-4o", "modle": "typo" }"#).unwrap();

    make_doc(&workdir)
        .env("MAKE_DOC_API_TOKEN", "sk-test")
        .env("MAKE_DOC_API_URL", "http://127.0.0.1:9/v1")
        .arg("--input-dir")
        .arg("include")
        .arg("--output-dir")
        .arg("site")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("modle"));
}

#[test]
fn nonexistent_input_dir_is_file_system_error() {
    let workdir = TempDir::new().unwrap();
    let output = workdir.path().join("site");

    make_doc(&workdir)
        .env("MAKE_DOC_API_TOKEN", "sk-test")
        .env("MAKE_DOC_API_URL", "http://127.0.0.1:9/v1")
        .arg("--input-dir")
        .arg(workdir.path().join("missing"))
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("路径不存在"));

    assert!(!output.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_run_against_stub_server() {
    let server = StubServer::start().await;
    let base_url = server.base_url.clone();
    let workdir = TempDir::new().unwrap();
    let input = create_input_dir();
    let output = workdir.path().join("site");

    let mut cmd = make_doc(&workdir);
    cmd.env("MAKE_DOC_API_TOKEN", "sk-test")
        .env("MAKE_DOC_API_URL", base_url)
        .arg("--input-dir")
        .arg(input.path())
        .arg("--output-dir")
        .arg(&output)
        .arg("--concurrency")
        .arg("2");
    // 桩服务运行在测试的运行时上，子进程在阻塞线程里等待
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("3 generated, 0 skipped"));

    assert_eq!(server.hits(), 5);
    assert_eq!(list_docs(&output), vec!["net/http.md", "net/socket.md", "zlib.md"]);
    assert!(output.join("index.md").is_file());
    assert!(output.join(".vitepress/sidebar.json").is_file());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn api_failure_exits_with_api_code() {
    let server = StubServer::failing_on("sock_open", 403).await;
    let base_url = server.base_url.clone();
    let workdir = TempDir::new().unwrap();
    let input = create_input_dir();

    let mut cmd = make_doc(&workdir);
    cmd.env("MAKE_DOC_API_TOKEN", "sk-test")
        .env("MAKE_DOC_API_URL", base_url)
        .arg("--input-dir")
        .arg(input.path())
        .arg("--output-dir")
        .arg("site");
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    assert.code(4).stderr(predicate::str::contains("403"));
}
