//! Tool dispatch behavior exercised through the assembled gateway.

use github_mcp_gateway::config::{default_enabled_toolsets, null_translator, McpServerConfig};
use github_mcp_gateway::errors::ApiErrorSink;
use github_mcp_gateway::github::RequestClaims;
use github_mcp_gateway::mcp::build_gateway;
use github_mcp_gateway::toolsets::ToolInvocation;

fn config(read_only: bool, dynamic: bool) -> McpServerConfig {
    McpServerConfig {
        version: "0.0.0-test".to_owned(),
        host: String::new(),
        token: "ghp_test_token".to_owned(),
        enabled_toolsets: default_enabled_toolsets(),
        dynamic_toolsets: dynamic,
        read_only,
        translator: null_translator(),
    }
}

#[test]
fn full_gateway_routes_read_and_write_tools() {
    let server = build_gateway(&config(false, false)).expect("gateway");
    let toolsets = &server.state().toolsets;

    assert!(toolsets.find_tool("get_me").is_some());
    assert!(toolsets.find_tool("create_issue").is_some());
    assert!(toolsets.find_tool("no_such_tool").is_none());
}

#[test]
fn read_only_gateway_hides_write_tools() {
    let server = build_gateway(&config(true, false)).expect("gateway");
    let toolsets = &server.state().toolsets;

    assert!(toolsets.find_tool("get_me").is_some());
    assert!(toolsets.find_tool("create_issue").is_none());
    assert!(toolsets.find_tool("merge_pull_request").is_none());
}

#[test]
fn dynamic_gateway_starts_with_every_toolset_disabled() {
    let server = build_gateway(&config(false, true)).expect("gateway");
    let toolsets = &server.state().toolsets;

    assert!(toolsets.find_tool("get_me").is_none());
    assert!(toolsets
        .enable_toolset("context")
        .expect("context toolset exists"));
    assert!(toolsets.find_tool("get_me").is_some());
}

#[test]
fn subset_selection_enables_only_named_toolsets() {
    let mut cfg = config(false, false);
    cfg.enabled_toolsets = vec!["issues".to_owned()];

    let server = build_gateway(&cfg).expect("gateway");
    let toolsets = &server.state().toolsets;

    assert!(toolsets.find_tool("get_issue").is_some());
    assert!(toolsets.find_tool("get_me").is_none());
}

#[tokio::test]
async fn malformed_arguments_fail_without_a_network_call() {
    let server = build_gateway(&config(false, false)).expect("gateway");
    let tool = server
        .state()
        .toolsets
        .find_tool("get_issue")
        .expect("get_issue enabled");

    // Missing required fields: the handler must reject the call during
    // argument parsing, long before any HTTP request is attempted.
    let invocation = ToolInvocation {
        arguments: serde_json::Map::new(),
        claims: RequestClaims::default(),
        errors: ApiErrorSink::default(),
    };

    let err = tool.call(invocation).await.expect_err("invalid params");
    assert!(
        err.message.contains("get_issue"),
        "error should name the tool: {}",
        err.message
    );
}
