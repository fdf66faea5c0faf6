//! Streamable HTTP transport for multi-client deployments.
//!
//! Mounts a [`StreamableHttpService`] behind an axum router on `/mcp`.
//! Every session shares the same gateway state, so a toolset enabled by
//! one session is visible to all of them.

use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::server::build_gateway;
use crate::config::HttpServerConfig;
use crate::translations::translation_helper;
use crate::{AppError, Result};

/// SSE keep-alive interval for idle sessions.
const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// How long in-flight requests get to drain after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Handler for `GET /health`. Returns 200 OK with a plain-text body so
/// deployments can probe liveness without opening an MCP session.
async fn health() -> &'static str {
    "ok"
}

/// Serve the MCP gateway over streamable HTTP until the token fires.
///
/// # Errors
///
/// Returns `AppError::Config` for a bad configuration,
/// `AppError::Transport` when the listener fails to bind or serve, and
/// `AppError::Shutdown` when in-flight requests fail to drain in time.
pub async fn run_http_server(config: HttpServerConfig, ct: CancellationToken) -> Result<()> {
    let mut config = config;
    let (translator, dump_translations) = translation_helper();
    config.server.translator = translator;

    let server = build_gateway(&config.server)?;
    if config.export_translations {
        dump_translations()?;
    }

    // The service gets the same token as the listener, so a shutdown
    // signal also terminates active sessions instead of waiting for
    // their streams to drain.
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            sse_keep_alive: Some(KEEP_ALIVE),
            stateful_mode: true,
            sse_retry: None,
            cancellation_token: ct.clone(),
        },
    );

    let router = Router::new()
        .nest_service("/mcp", service)
        .route("/health", get(health));

    let bind = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Transport(format!("failed to bind {bind}: {err}")))?;

    info!(%bind, "starting streamable HTTP MCP transport");

    let shutdown_ct = ct.clone();
    let mut handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown_ct.cancelled().await })
            .await
    });

    let served = tokio::select! {
        joined = &mut handle => joined,
        () = ct.cancelled() => {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    return Err(AppError::Shutdown(format!(
                        "HTTP server did not drain within {}s",
                        SHUTDOWN_GRACE.as_secs()
                    )));
                }
            }
        }
    };

    match served {
        Ok(Ok(())) => {
            info!("streamable HTTP MCP transport shut down");
            Ok(())
        }
        Ok(Err(err)) => Err(AppError::Transport(format!("HTTP server error: {err}"))),
        Err(err) => Err(AppError::Transport(format!("HTTP server task failed: {err}"))),
    }
}
