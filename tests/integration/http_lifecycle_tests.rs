//! Startup and shutdown behavior of the streamable HTTP transport.

use github_mcp_gateway::config::{
    default_enabled_toolsets, null_translator, HttpServerConfig, McpServerConfig,
};
use github_mcp_gateway::mcp::http::run_http_server;
use github_mcp_gateway::AppError;
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

#[tokio::test]
async fn cancellation_shuts_the_server_down_cleanly() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let handle = tokio::spawn(async move { run_http_server(test_config(port), server_ct).await });

    tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    ct.cancel();

    let result = tokio::time::timeout(std::time::Duration::from_secs(10), handle)
        .await
        .expect("server exited within the grace period")
        .expect("task not panicked");
    assert!(result.is_ok(), "clean shutdown should return Ok: {result:?}");
}

#[tokio::test]
async fn interrupt_with_a_live_session_settles_within_the_grace_period() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let handle = tokio::spawn(async move { run_http_server(test_config(port), server_ct).await });
    tokio::time::sleep(std::time::Duration::from_millis(250)).await;

    let endpoint = format!("http://127.0.0.1:{port}/mcp");
    let client = reqwest::Client::new();

    let init = client
        .post(&endpoint)
        .header("accept", "application/json, text/event-stream")
        .header("content-type", "application/json")
        .body(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"lifecycle-test","version":"0.0.0"}}}"#,
        )
        .send()
        .await
        .expect("initialize request");
    let session = init
        .headers()
        .get("mcp-session-id")
        .cloned()
        .expect("session id header");
    drop(init);

    // A standalone SSE stream held open is a genuinely in-flight
    // response; an idle connection would let the listener drain
    // immediately and never exercise the session-termination path.
    let stream = client
        .get(&endpoint)
        .header("accept", "text/event-stream")
        .header("mcp-session-id", session)
        .send()
        .await
        .expect("standalone stream");
    assert_eq!(stream.status(), reqwest::StatusCode::OK);

    let started = std::time::Instant::now();
    ct.cancel();

    let result = tokio::time::timeout(std::time::Duration::from_secs(10), handle)
        .await
        .expect("server settled after the grace period")
        .expect("task not panicked");
    drop(stream);

    assert!(
        started.elapsed() < std::time::Duration::from_secs(8),
        "server took {:?} to settle",
        started.elapsed()
    );
    match result {
        // Sessions terminated within the grace period, or the bounded
        // force-termination kicked in after it elapsed.
        Ok(()) | Err(AppError::Shutdown(_)) => {}
        Err(other) => panic!("unexpected shutdown result: {other}"),
    }
}

#[tokio::test]
async fn occupied_port_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    // Keep the listener alive so the port stays occupied.

    let ct = CancellationToken::new();
    let result = run_http_server(test_config(port), ct).await;
    assert!(
        matches!(result, Err(AppError::Transport(_))),
        "expected a transport error, got {result:?}"
    );
    drop(listener);
}

#[tokio::test]
async fn empty_token_fails_before_binding() {
    let mut config = test_config(1); // port 1 would fail to bind, but we never get there
    config.server.token = String::new();

    let result = run_http_server(config, CancellationToken::new()).await;
    assert!(
        matches!(result, Err(AppError::Config(_))),
        "expected a config error, got {result:?}"
    );
}
