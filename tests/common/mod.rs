//! 集成测试共用的 OpenAI 兼容桩服务与输入目录

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const SOCKET_H: &str = r#"#pragma once

/* Socket address. */
struct sock_addr {
    char host[64];
    int port;
};

// Open a connection.
int sock_open(const struct sock_addr *addr);

// Close a handle.
void sock_close(int fd);
"#;

pub const HTTP_HPP: &str = "// Fetch a URL.\nint http_get(const char *url);\n";

pub const ZLIB_H: &str = "/* Compress. */\nint deflate(int level);\n";

#[derive(Clone)]
struct StubState {
    hits: Arc<AtomicUsize>,
    /// 声明消息包含该子串时返回指定状态码
    fail_on: Option<(String, u16)>,
    /// 每个请求回复前的等待时间
    delay: Option<Duration>,
}

/// 桩服务
pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    pub async fn start() -> Self {
        Self::start_with(None, None).await
    }

    pub async fn failing_on(needle: &str, status: u16) -> Self {
        Self::start_with(Some((needle.to_string(), status)), None).await
    }

    /// 每个请求都等待 `delay` 后才回复
    pub async fn slow(delay: Duration) -> Self {
        Self::start_with(None, Some(delay)).await
    }

    async fn start_with(fail_on: Option<(String, u16)>, delay: Option<Duration>) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = StubState {
            hits: hits.clone(),
            fail_on,
            delay,
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn chat_completions(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let declaration = body["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|message| message["content"].as_str())
        .unwrap_or_default()
        .to_string();

    if let Some((needle, status)) = &state.fail_on {
        if declaration.contains(needle.as_str()) {
            let status = StatusCode::from_u16(*status).unwrap();
            return (status, r#"{"error":{"message":"stub failure"}}"#).into_response();
        }
    }

    let name = declaration.split('`').nth(1).unwrap_or("unknown");
    let content = format!("## {name} {{#{name}}}\n\nGenerated doc for `{name}`.");
    Json(json!({
        "id": "chatcmpl-stub",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

/// 三个头文件，外加一个会被忽略的文件
pub fn create_input_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "net/socket.h", SOCKET_H);
    write(dir.path(), "net/http.hpp", HTTP_HPP);
    write(dir.path(), "zlib.h", ZLIB_H);
    write(dir.path(), "README.md", "# sdk\n");
    dir
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// 输出目录下 files/ 中的全部文档（相对路径，已排序）
pub fn list_docs(output: &Path) -> Vec<String> {
    let root = output.join("files");
    let mut docs: Vec<String> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    docs.sort();
    docs
}
