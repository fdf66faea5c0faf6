//! Stdio transport for direct invocation by MCP clients.

use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::iolog::{TranscriptReader, TranscriptWriter};
use super::server::build_gateway;
use crate::config::StdioServerConfig;
use crate::translations::translation_helper;
use crate::{AppError, Result};

/// Serve the MCP gateway over stdin/stdout until the token fires.
///
/// # Errors
///
/// Returns `AppError::Config` for a bad configuration and
/// `AppError::Transport` when the stdio transport fails.
pub async fn run_stdio_server(config: StdioServerConfig, ct: CancellationToken) -> Result<()> {
    let mut config = config;
    let (translator, dump_translations) = translation_helper();
    config.server.translator = translator;

    let server = build_gateway(&config.server)?;
    if config.export_translations {
        dump_translations()?;
    }

    info!("starting stdio MCP transport");
    let service = if config.enable_command_logging {
        let transport = (
            TranscriptReader::new(tokio::io::stdin()),
            TranscriptWriter::new(tokio::io::stdout()),
        );
        server
            .serve_with_ct(transport, ct)
            .await
            .map_err(|err| AppError::Transport(format!("stdio transport failed: {err}")))?
    } else {
        server
            .serve_with_ct(stdio(), ct)
            .await
            .map_err(|err| AppError::Transport(format!("stdio transport failed: {err}")))?
    };

    service
        .waiting()
        .await
        .map_err(|err| AppError::Transport(format!("stdio service error: {err}")))?;

    info!("stdio MCP transport shut down");
    Ok(())
}
