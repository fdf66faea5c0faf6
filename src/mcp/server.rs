//! Gateway assembly: configuration to a ready-to-serve handler.

use std::sync::Arc;

use tracing::info;

use super::handler::{GatewayServer, GatewayState};
use crate::apihost::parse_api_host;
use crate::config::{resolve_enabled_toolsets, McpServerConfig};
use crate::github::tools::default_toolset_group;
use crate::github::ClientManager;
use crate::Result;

/// Build the gateway server from a validated configuration.
///
/// Resolves the target host, constructs the shared client factory, and
/// enables the requested toolsets. Unknown toolset names fail the whole
/// startup rather than being skipped.
///
/// # Errors
///
/// Returns `AppError::Config` for a missing token or malformed host and
/// `AppError::Toolset` when a requested toolset does not exist.
pub fn build_gateway(config: &McpServerConfig) -> Result<GatewayServer> {
    config.validate()?;

    let host = parse_api_host(&config.host)?;
    info!(kind = ?host.kind, rest = %host.rest_url, "resolved github endpoints");

    let manager = Arc::new(ClientManager::new(
        host,
        config.token.clone(),
        &config.version,
    )?);
    let toolsets = default_toolset_group(&manager, config.read_only, &config.translator);

    let enabled = resolve_enabled_toolsets(
        &config.enabled_toolsets,
        config.dynamic_toolsets,
        &toolsets.names(),
    );
    toolsets.enable_toolsets(&enabled)?;
    info!(
        toolsets = enabled.len(),
        dynamic = config.dynamic_toolsets,
        read_only = config.read_only,
        "toolsets enabled"
    );

    Ok(GatewayServer::new(Arc::new(GatewayState {
        version: config.version.clone(),
        manager,
        toolsets,
        dynamic: config.dynamic_toolsets,
    })))
}
