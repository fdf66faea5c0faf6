//! Toolset registry.
//!
//! A toolset is a named, independently enable-able group of tools. The
//! group is built once at startup from the catalog and consulted by the
//! MCP handler for listing and routing; the only post-startup mutation
//! is the idempotent dynamic-mode activation flip.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rmcp::model::{CallToolResult, Tool, ToolAnnotations};

use crate::errors::ApiErrorSink;
use crate::github::RequestClaims;
use crate::{AppError, Result};

/// JSON object map used for tool arguments and schemas.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Boxed future returned by a tool handler.
pub type ToolFuture =
    Pin<Box<dyn Future<Output = std::result::Result<CallToolResult, rmcp::ErrorData>> + Send>>;

/// Uniform handler signature every registered tool implements.
pub type ToolHandler = Arc<dyn Fn(ToolInvocation) -> ToolFuture + Send + Sync>;

/// Everything a tool handler receives for one invocation.
pub struct ToolInvocation {
    /// Caller-supplied arguments.
    pub arguments: JsonObject,
    /// Request-scoped credential claims.
    pub claims: RequestClaims,
    /// Fresh per-invocation API error sink.
    pub errors: ApiErrorSink,
}

/// Convert a `serde_json::Value::Object` into the `Arc<Map>` expected by `Tool`.
#[must_use]
pub fn object_schema(value: serde_json::Value) -> Arc<JsonObject> {
    match value {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::default()),
    }
}

/// Build a [`Tool`] definition from the fields every catalog entry
/// actually sets, leaving the optional metadata fields empty.
#[must_use]
pub fn tool_definition(
    name: impl Into<Cow<'static, str>>,
    description: impl Into<Cow<'static, str>>,
    input_schema: Arc<JsonObject>,
    annotations: Option<ToolAnnotations>,
) -> Tool {
    Tool {
        name: name.into(),
        title: None,
        description: Some(description.into()),
        input_schema,
        output_schema: None,
        annotations,
        icons: None,
        meta: None,
    }
}

/// One registered tool: its protocol definition plus its handler.
pub struct ServerTool {
    /// Protocol-level definition (name, description, schema, annotations).
    pub tool: Tool,
    /// Whether the tool mutates remote state. Mutating tools are
    /// suppressed entirely in read-only mode.
    pub mutating: bool,
    handler: ToolHandler,
}

impl ServerTool {
    /// Register a read-only tool.
    pub fn read(tool: Tool, handler: impl Fn(ToolInvocation) -> ToolFuture + Send + Sync + 'static) -> Self {
        Self {
            tool,
            mutating: false,
            handler: Arc::new(handler),
        }
    }

    /// Register a mutating tool.
    pub fn write(tool: Tool, handler: impl Fn(ToolInvocation) -> ToolFuture + Send + Sync + 'static) -> Self {
        Self {
            tool,
            mutating: true,
            handler: Arc::new(handler),
        }
    }

    /// Invoke the tool.
    pub fn call(&self, invocation: ToolInvocation) -> ToolFuture {
        (self.handler)(invocation)
    }
}

/// A named group of tools with an enabled flag.
pub struct Toolset {
    name: String,
    description: String,
    enabled: AtomicBool,
    tools: Vec<ServerTool>,
}

impl Toolset {
    /// Create a disabled toolset.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: AtomicBool::new(false),
            tools: Vec::new(),
        }
    }

    /// Add a tool, builder style.
    #[must_use]
    pub fn with_tool(mut self, tool: ServerTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Toolset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the toolset is currently active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Flip the toolset active. Returns `true` only for the activation
    /// that actually changed the state, so concurrent first-call races
    /// are idempotent.
    fn enable(&self) -> bool {
        !self.enabled.swap(true, Ordering::SeqCst)
    }
}

/// The registry: every catalog toolset, keyed by name.
pub struct ToolsetGroup {
    toolsets: BTreeMap<String, Toolset>,
    read_only: bool,
}

impl ToolsetGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(read_only: bool) -> Self {
        Self {
            toolsets: BTreeMap::new(),
            read_only,
        }
    }

    /// Whether mutating tools are suppressed.
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Add a toolset to the registry.
    pub fn insert(&mut self, toolset: Toolset) {
        self.toolsets.insert(toolset.name().to_owned(), toolset);
    }

    /// Names of every catalog toolset, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.toolsets.keys().cloned().collect()
    }

    /// Iterate over `(name, description, enabled)` for every toolset.
    #[must_use]
    pub fn summaries(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.toolsets
            .values()
            .map(|ts| (ts.name(), ts.description(), ts.is_enabled()))
    }

    /// Mark the named toolsets active.
    ///
    /// The literal "all" alias is resolved at the configuration layer
    /// before this call; the registry only accepts explicit names.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Toolset` on any unknown name; nothing is
    /// activated when that happens.
    pub fn enable_toolsets(&self, names: &[String]) -> Result<()> {
        for name in names {
            if !self.toolsets.contains_key(name) {
                return Err(AppError::Toolset(format!("toolset {name} does not exist")));
            }
        }
        for name in names {
            if let Some(toolset) = self.toolsets.get(name) {
                toolset.enable();
            }
        }
        Ok(())
    }

    /// Activate one toolset at runtime (dynamic mode).
    ///
    /// Returns `true` when this call performed the activation, `false`
    /// when the toolset was already active (a no-op, not an error).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Toolset` for an unknown name.
    pub fn enable_toolset(&self, name: &str) -> Result<bool> {
        let toolset = self
            .toolsets
            .get(name)
            .ok_or_else(|| AppError::Toolset(format!("toolset {name} does not exist")))?;
        Ok(toolset.enable())
    }

    /// Protocol definitions of every tool currently registered: tools
    /// of enabled toolsets, minus mutating tools in read-only mode.
    #[must_use]
    pub fn active_tools(&self) -> Vec<Tool> {
        self.toolsets
            .values()
            .filter(|ts| ts.is_enabled())
            .flat_map(|ts| ts.tools.iter())
            .filter(|tool| !(self.read_only && tool.mutating))
            .map(|tool| tool.tool.clone())
            .collect()
    }

    /// Look up a routable tool by name among enabled toolsets.
    ///
    /// Mutating tools are unreachable in read-only mode, exactly as if
    /// they had never been registered.
    #[must_use]
    pub fn find_tool(&self, name: &str) -> Option<&ServerTool> {
        self.toolsets
            .values()
            .filter(|ts| ts.is_enabled())
            .flat_map(|ts| ts.tools.iter())
            .filter(|tool| !(self.read_only && tool.mutating))
            .find(|tool| tool.tool.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;
    use serde_json::json;

    fn stub_tool(name: &str) -> Tool {
        tool_definition(
            name.to_owned(),
            "stub",
            object_schema(json!({ "type": "object" })),
            None,
        )
    }

    fn stub_handler(_invocation: ToolInvocation) -> ToolFuture {
        Box::pin(async { Ok(CallToolResult::success(vec![Content::text("ok")])) })
    }

    fn group() -> ToolsetGroup {
        let mut group = ToolsetGroup::new(false);
        group.insert(
            Toolset::new("issues", "issue tools")
                .with_tool(ServerTool::read(stub_tool("get_issue"), stub_handler))
                .with_tool(ServerTool::write(stub_tool("create_issue"), stub_handler)),
        );
        group.insert(
            Toolset::new("repos", "repository tools")
                .with_tool(ServerTool::read(stub_tool("search_repositories"), stub_handler)),
        );
        group
    }

    #[test]
    fn tool_definition_leaves_metadata_fields_unset() {
        let tool = stub_tool("ping");
        assert_eq!(tool.name, "ping");
        assert_eq!(tool.description.as_deref(), Some("stub"));
        assert!(tool.title.is_none());
        assert!(tool.icons.is_none());
        assert!(tool.meta.is_none());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn unknown_toolset_fails_and_enables_nothing() {
        let group = group();
        let err = group
            .enable_toolsets(&["issues".into(), "bogus".into()])
            .unwrap_err();
        assert!(matches!(err, AppError::Toolset(_)), "got: {err}");
        assert!(group.active_tools().is_empty());
    }

    #[test]
    fn enabling_registers_all_member_tools() {
        let group = group();
        #[allow(clippy::unwrap_used)]
        group
            .enable_toolsets(&["issues".into(), "repos".into()])
            .unwrap();

        let names: Vec<_> = group
            .active_tools()
            .iter()
            .map(|tool| tool.name.to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"get_issue".to_owned()));
        assert!(names.contains(&"create_issue".to_owned()));
        assert!(names.contains(&"search_repositories".to_owned()));
    }

    #[test]
    fn read_only_suppresses_mutating_tools() {
        let mut group = ToolsetGroup::new(true);
        group.insert(
            Toolset::new("issues", "issue tools")
                .with_tool(ServerTool::read(stub_tool("get_issue"), stub_handler))
                .with_tool(ServerTool::write(stub_tool("create_issue"), stub_handler)),
        );
        assert!(group.read_only());
        #[allow(clippy::unwrap_used)]
        group.enable_toolsets(&["issues".into()]).unwrap();

        let names: Vec<_> = group
            .active_tools()
            .iter()
            .map(|tool| tool.name.to_string())
            .collect();
        assert_eq!(names, vec!["get_issue".to_owned()]);
        assert!(group.find_tool("create_issue").is_none());
        assert!(group.find_tool("get_issue").is_some());
    }

    #[test]
    fn disabled_toolsets_are_not_routable() {
        let group = group();
        assert!(group.find_tool("get_issue").is_none());
    }

    #[test]
    fn dynamic_activation_is_idempotent() {
        let group = group();
        #[allow(clippy::unwrap_used)]
        {
            assert!(group.enable_toolset("issues").unwrap());
            assert!(!group.enable_toolset("issues").unwrap());
        }
        // No duplicate registration after repeated activation.
        assert_eq!(group.active_tools().len(), 2);
    }

    #[test]
    fn dynamic_activation_of_unknown_toolset_errors() {
        let group = group();
        assert!(group.enable_toolset("bogus").is_err());
    }
}
