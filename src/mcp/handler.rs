//! MCP server handler and shared gateway state.

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, InitializeRequestParam, InitializeResult,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    ToolsCapability,
};
use rmcp::service::{RequestContext, RoleServer};
use tracing::{info, info_span, warn, Instrument};

use super::{auth, dynamic};
use crate::errors::ApiErrorSink;
use crate::github::{ClientManager, PRODUCT_NAME};
use crate::toolsets::{ToolInvocation, ToolsetGroup};

/// Everything a tool dispatch needs, shared by every session.
pub struct GatewayState {
    /// Version advertised to clients and embedded in the user agent.
    pub version: String,
    /// Factory for credential-scoped GitHub clients.
    pub manager: Arc<ClientManager>,
    /// The toolset registry, including disabled entries.
    pub toolsets: ToolsetGroup,
    /// Whether the dynamic meta-tools are exposed.
    pub dynamic: bool,
}

/// The MCP server backing both the stdio and HTTP transports.
#[derive(Clone)]
pub struct GatewayServer {
    state: Arc<GatewayState>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(state: Arc<GatewayState>) -> Self {
        Self { state }
    }

    /// Access the shared gateway state.
    #[must_use]
    pub fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }
}

impl ServerHandler for GatewayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(true),
                }),
                ..ServerCapabilities::default()
            },
            server_info: Implementation {
                name: PRODUCT_NAME.to_owned(),
                version: self.state.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "GitHub MCP gateway. Call list_tools to discover the enabled GitHub tools."
                    .to_owned(),
            ),
        }
    }

    fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<InitializeResult, rmcp::ErrorData>> + Send + '_ {
        let client = &request.client_info;
        info!(client = %client.name, version = %client.version, "client handshake");
        self.state
            .manager
            .set_client_identity(&client.name, &client.version);

        std::future::ready(Ok(self.get_info()))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        let state = Arc::clone(&self.state);
        let span = info_span!("call_tool", tool = %request.name);

        async move {
            let claims = auth::claims_from_context(&context);
            let arguments = request.arguments.unwrap_or_default();
            let name = request.name.as_ref();

            if state.dynamic {
                if let Some(result) = dynamic::try_call(&state, name, &arguments, &context).await {
                    return result;
                }
            }

            let Some(tool) = state.toolsets.find_tool(name) else {
                return Err(rmcp::ErrorData::invalid_params(
                    format!("tool {name} is not available"),
                    None,
                ));
            };

            // Fresh sink per dispatch so one call's failures never leak
            // into the next.
            let errors = ApiErrorSink::default();
            let invocation = ToolInvocation {
                arguments,
                claims,
                errors: errors.clone(),
            };

            let result = tool.call(invocation).await;
            for api_error in errors.drain() {
                warn!(
                    tool = name,
                    status = api_error.status,
                    "github api error: {}",
                    api_error.message
                );
            }
            result
        }
        .instrument(span)
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        let mut tools = self.state.toolsets.active_tools();
        if self.state.dynamic {
            tools.extend(dynamic::meta_tools());
        }

        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }
}
