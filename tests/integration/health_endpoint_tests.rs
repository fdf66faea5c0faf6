//! Integration tests for the HTTP transport's health endpoint.

use github_mcp_gateway::config::{
    default_enabled_toolsets, null_translator, HttpServerConfig, McpServerConfig,
};
use github_mcp_gateway::mcp::http::run_http_server;
use tokio_util::sync::CancellationToken;

fn test_config(port: u16) -> HttpServerConfig {
    HttpServerConfig {
        server: McpServerConfig {
            version: "0.0.0-test".to_owned(),
            host: String::new(),
            token: "ghp_test_token".to_owned(),
            enabled_toolsets: default_enabled_toolsets(),
            dynamic_toolsets: false,
            read_only: false,
            translator: null_translator(),
        },
        port,
        export_translations: false,
    }
}

/// Discover a free port, then start the server on it.
async fn spawn_server() -> (String, CancellationToken, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let handle = tokio::spawn(async move {
        run_http_server(test_config(port), server_ct)
            .await
            .expect("http server");
    });

    tokio::time::sleep(std::time::Duration::from_millis(250)).await;

    (format!("http://127.0.0.1:{port}"), ct, handle)
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (base_url, ct, handle) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("GET /health");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.expect("body"), "ok");

    ct.cancel();
    let _ = handle.await;
}

#[tokio::test]
async fn mcp_endpoint_rejects_a_plain_get() {
    let (base_url, ct, handle) = spawn_server().await;

    // The MCP endpoint requires protocol headers; a bare browser-style
    // GET must not be treated as a session.
    let resp = reqwest::get(format!("{base_url}/mcp"))
        .await
        .expect("GET /mcp");
    assert!(
        resp.status().is_client_error(),
        "expected 4xx for bare GET /mcp, got {}",
        resp.status()
    );

    ct.cancel();
    let _ = handle.await;
}
