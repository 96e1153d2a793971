//! Integration tests for the HTTP API.
//!
//! Each test spins up a real server on a random port and talks to it with
//! reqwest.

use std::path::Path;
use std::sync::Arc;

use mdterm_config::ServerConfig;
use mdterm_exec::Executor;
use mdterm_server::{create_router, AppState, SessionRegistry};
use serde_json::Value;

/// Spin up a test server whose executor falls back to `server_cwd`.
async fn start_test_server(server_cwd: &Path) -> String {
    let server = ServerConfig {
        ws_port: 4555,
        public_host: "docs.example".into(),
        ..Default::default()
    };
    let state = Arc::new(AppState::new(
        Executor::new(server_cwd),
        SessionRegistry::new(),
        &server,
    ));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Helper to GET a URL and return (status, json).
async fn get(base: &str, path: &str) -> (u16, Value) {
    let resp = reqwest::get(format!("{}{}", base, path)).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

/// Helper to POST a raw JSON body and return (status, json).
async fn post_raw(base: &str, path: &str, body: &str) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

async fn execute(base: &str, body: Value) -> (u16, Value) {
    post_raw(base, "/api/terminal/execute", &body.to_string()).await
}

// ============================================================================
// Health and info
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = get(&base, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["active_sessions"], 0);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_terminal_info() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = get(&base, "/api/terminal/info").await;
    assert_eq!(status, 200);
    assert_eq!(body["websocketUrl"], "ws://docs.example:4555");
    assert_eq!(body["status"], "available");
    assert_eq!(body["port"], 4555);
    assert!(body["message"].is_string());
}

// ============================================================================
// Execute: success paths
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_ls_in_tmp() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = execute(
        &base,
        serde_json::json!({"command": "ls -la", "cwd": "/tmp"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["isError"], false);
    assert_eq!(body["cwd"], "/tmp");
    assert!(!body["output"].as_str().unwrap().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_cd_returns_resolved_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("chapters")).unwrap();
    let base = start_test_server(dir.path()).await;
    let cwd = dir.path().display().to_string();

    let (status, body) = execute(
        &base,
        serde_json::json!({"command": "cd chapters", "cwd": cwd}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["isError"], false);
    assert_eq!(body["output"], "");
    assert_eq!(
        body["cwd"].as_str().unwrap(),
        dir.path().join("chapters").display().to_string()
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_cd_nonexistent_keeps_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = execute(
        &base,
        serde_json::json!({"command": "cd /nonexistent", "cwd": "/tmp"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["isError"], true);
    assert_eq!(body["cwd"], "/tmp");
}

#[cfg(unix)]
#[tokio::test]
async fn test_traversal_uses_server_cwd() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("server-marker.md"), "").unwrap();
    let base = start_test_server(dir.path()).await;

    let (status, body) = execute(
        &base,
        serde_json::json!({"command": "ls", "cwd": "../../../etc"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["isError"], false);
    assert!(body["output"].as_str().unwrap().contains("server-marker.md"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_stderr_sets_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = execute(
        &base,
        serde_json::json!({"command": "cat missing-chapter.md"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["isError"], true);
    assert!(body["output"].as_str().unwrap().contains("missing-chapter.md"));
}

// ============================================================================
// Execute: rejections
// ============================================================================

#[tokio::test]
async fn test_sudo_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = execute(
        &base,
        serde_json::json!({"command": "sudo rm -rf /", "cwd": "/tmp"}),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["isError"], true);
    assert_eq!(body["cwd"], "/tmp");
    assert!(body["output"]
        .as_str()
        .unwrap()
        .starts_with("Command blocked"));
}

#[tokio::test]
async fn test_unlisted_command_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = execute(&base, serde_json::json!({"command": "vim notes.md"})).await;
    assert_eq!(status, 403);
    assert_eq!(body["isError"], true);
    assert!(body["output"]
        .as_str()
        .unwrap()
        .starts_with("Command not allowed"));
    assert_eq!(body["cwd"], dir.path().display().to_string());
}

#[tokio::test]
async fn test_missing_command_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;

    let (status, body) = execute(&base, serde_json::json!({"cwd": "/tmp"})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Command is required");

    let (status, _) = execute(&base, serde_json::json!({"command": "   "})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_non_string_command_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = execute(&base, serde_json::json!({"command": 42})).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path()).await;
    let (status, body) = post_raw(&base, "/api/terminal/execute", "{not json").await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());
}
