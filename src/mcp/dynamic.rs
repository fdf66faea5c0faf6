//! Dynamic toolset discovery meta-tools.
//!
//! When dynamic mode is on the server starts with a minimal tool list
//! and lets the client grow it at runtime. Activation is additive for
//! the life of the process; there is deliberately no disable tool.

use rmcp::model::{CallToolResult, Content, Tool};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::json;
use tracing::{info, warn};

use super::handler::GatewayState;
use crate::toolsets::{object_schema, tool_definition, JsonObject};
use crate::AppError;

const LIST_TOOLSETS: &str = "list_available_toolsets";
const ENABLE_TOOLSET: &str = "enable_toolset";

/// The meta-tools appended to the advertised list in dynamic mode.
#[must_use]
pub fn meta_tools() -> Vec<Tool> {
    vec![
        tool_definition(
            LIST_TOOLSETS,
            "List all available toolsets on this GitHub gateway, including \
             whether each one is currently enabled.",
            object_schema(json!({ "type": "object", "properties": {} })),
            None,
        ),
        tool_definition(
            ENABLE_TOOLSET,
            "Enable one of the available toolsets so its tools become callable. \
             Activation lasts for the rest of the process lifetime.",
            object_schema(json!({
                "type": "object",
                "properties": {
                    "toolset": { "type": "string", "description": "Name of the toolset to enable" }
                },
                "required": ["toolset"]
            })),
            None,
        ),
    ]
}

/// Intercept a call if it targets one of the meta-tools.
///
/// Returns `None` for every other tool name so the caller falls through
/// to the ordinary registry dispatch.
pub async fn try_call(
    state: &GatewayState,
    name: &str,
    arguments: &JsonObject,
    context: &RequestContext<RoleServer>,
) -> Option<Result<CallToolResult, rmcp::ErrorData>> {
    match name {
        LIST_TOOLSETS => Some(list_toolsets(state)),
        ENABLE_TOOLSET => Some(enable_toolset(state, arguments, context).await),
        _ => None,
    }
}

fn list_toolsets(state: &GatewayState) -> Result<CallToolResult, rmcp::ErrorData> {
    let summaries: Vec<_> = state
        .toolsets
        .summaries()
        .map(|(name, description, enabled)| {
            json!({
                "name": name,
                "description": description,
                "currently_enabled": enabled,
                "can_enable": true,
            })
        })
        .collect();

    let content = Content::json(&summaries).map_err(|err| {
        rmcp::ErrorData::internal_error(format!("failed to encode toolset list: {err}"), None)
    })?;
    Ok(CallToolResult::success(vec![content]))
}

async fn enable_toolset(
    state: &GatewayState,
    arguments: &JsonObject,
    context: &RequestContext<RoleServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let Some(name) = arguments.get("toolset").and_then(|value| value.as_str()) else {
        return Err(rmcp::ErrorData::invalid_params(
            "enable_toolset requires a toolset name",
            None,
        ));
    };

    match state.toolsets.enable_toolset(name) {
        Ok(true) => {
            info!(toolset = name, "toolset enabled at runtime");
            // Best effort: a client that misses the notification still
            // sees the new tools on its next list_tools call.
            if let Err(err) = context.peer.notify_tool_list_changed().await {
                warn!("failed to notify tool list change: {err}");
            }
            Ok(CallToolResult::success(vec![Content::text(format!(
                "Toolset {name} enabled"
            ))]))
        }
        Ok(false) => Ok(CallToolResult::success(vec![Content::text(format!(
            "Toolset {name} is already enabled"
        ))])),
        Err(AppError::Toolset(message)) => Err(rmcp::ErrorData::invalid_params(message, None)),
        Err(err) => Err(rmcp::ErrorData::internal_error(err.to_string(), None)),
    }
}
