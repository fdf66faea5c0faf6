//! Default GitHub toolset catalog.
//!
//! Every tool is data plus a boxed async handler behind the uniform
//! registry interface. Handlers obtain a correctly-scoped client from
//! the [`ClientManager`] for each invocation and never cache one.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, ToolAnnotations};
use serde_json::{json, Value};

use super::ClientManager;
use crate::errors::ApiErrorSink;
use crate::toolsets::{
    object_schema, tool_definition, JsonObject, ServerTool, Toolset, ToolsetGroup,
};
use crate::translations::Translator;
use crate::AppError;

fn read_annotations() -> Option<ToolAnnotations> {
    Some(ToolAnnotations {
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        ..ToolAnnotations::default()
    })
}

fn write_annotations(destructive: bool) -> Option<ToolAnnotations> {
    Some(ToolAnnotations {
        read_only_hint: Some(false),
        destructive_hint: Some(destructive),
        ..ToolAnnotations::default()
    })
}

fn parse_args<T: serde::de::DeserializeOwned>(
    tool: &str,
    arguments: JsonObject,
) -> Result<T, rmcp::ErrorData> {
    serde_json::from_value(Value::Object(arguments)).map_err(|err| {
        rmcp::ErrorData::invalid_params(format!("invalid {tool} parameters: {err}"), None)
    })
}

fn json_result(value: &Value) -> Result<CallToolResult, rmcp::ErrorData> {
    let content = Content::json(value).map_err(|err| {
        rmcp::ErrorData::internal_error(format!("failed to encode tool result: {err}"), None)
    })?;
    Ok(CallToolResult::success(vec![content]))
}

/// Record an API failure in the request's sink and surface it as an
/// in-band tool error rather than a protocol failure.
fn api_failure(sink: &ApiErrorSink, err: &AppError) -> CallToolResult {
    let status = match err {
        AppError::Api(msg) => msg
            .split(' ')
            .next()
            .and_then(|code| code.parse::<u16>().ok()),
        _ => None,
    };
    sink.record(err.to_string(), status);
    CallToolResult::error(vec![Content::text(format!("github api call failed: {err}"))])
}

/// Build the full catalog with every toolset disabled.
#[must_use]
pub fn default_toolset_group(
    manager: &Arc<ClientManager>,
    read_only: bool,
    translator: &Translator,
) -> ToolsetGroup {
    let mut group = ToolsetGroup::new(read_only);

    group.insert(
        Toolset::new("context", "Tools describing the current caller")
            .with_tool(get_me(manager, translator)),
    );
    group.insert(
        Toolset::new("repos", "Repository search and content tools")
            .with_tool(search_repositories(manager, translator))
            .with_tool(get_file_contents(manager, translator)),
    );
    group.insert(
        Toolset::new("issues", "Issue read and write tools")
            .with_tool(get_issue(manager, translator))
            .with_tool(list_issues(manager, translator))
            .with_tool(create_issue(manager, translator)),
    );
    group.insert(
        Toolset::new("pull_requests", "Pull request read and write tools")
            .with_tool(get_pull_request(manager, translator))
            .with_tool(merge_pull_request(manager, translator)),
    );
    group.insert(
        Toolset::new("discussions", "Discussion tools backed by GraphQL")
            .with_tool(list_discussions(manager, translator)),
    );

    group
}

fn get_me(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::read(
        tool_definition(
            "get_me",
            t(
                "TOOL_GET_ME_DESCRIPTION",
                "Get details of the authenticated GitHub user.",
            ),
            object_schema(json!({ "type": "object", "properties": {} })),
            read_annotations(),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let client = manager.rest(&invocation.claims);
                match client.get_json("user", &[]).await {
                    Ok(value) => json_result(&value),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct SearchRepositoriesInput {
    query: String,
    #[serde(default)]
    page: Option<u64>,
    #[serde(default)]
    per_page: Option<u64>,
}

fn search_repositories(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::read(
        tool_definition(
            "search_repositories",
            t(
                "TOOL_SEARCH_REPOSITORIES_DESCRIPTION",
                "Search for GitHub repositories.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" },
                    "page": { "type": "integer", "minimum": 1 },
                    "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
                },
                "required": ["query"]
            })),
            read_annotations(),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: SearchRepositoriesInput =
                    parse_args("search_repositories", invocation.arguments)?;
                let mut query = vec![("q", input.query)];
                if let Some(page) = input.page {
                    query.push(("page", page.to_string()));
                }
                if let Some(per_page) = input.per_page {
                    query.push(("per_page", per_page.to_string()));
                }

                let client = manager.rest(&invocation.claims);
                match client.get_json("search/repositories", &query).await {
                    Ok(value) => json_result(&value),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct GetFileContentsInput {
    owner: String,
    repo: String,
    path: String,
    #[serde(rename = "ref", default = "default_git_ref")]
    git_ref: String,
}

fn default_git_ref() -> String {
    "HEAD".to_owned()
}

fn get_file_contents(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::read(
        tool_definition(
            "get_file_contents",
            t(
                "TOOL_GET_FILE_CONTENTS_DESCRIPTION",
                "Get the contents of a file from a repository.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string" },
                    "repo": { "type": "string" },
                    "path": { "type": "string" },
                    "ref": { "type": "string", "default": "HEAD" }
                },
                "required": ["owner", "repo", "path"]
            })),
            read_annotations(),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: GetFileContentsInput =
                    parse_args("get_file_contents", invocation.arguments)?;

                let raw = manager.raw(&invocation.claims);
                match raw
                    .fetch_content(&input.owner, &input.repo, &input.git_ref, &input.path)
                    .await
                {
                    Ok(contents) => Ok(CallToolResult::success(vec![Content::text(contents)])),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct GetIssueInput {
    owner: String,
    repo: String,
    issue_number: u64,
}

fn get_issue(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::read(
        tool_definition(
            "get_issue",
            t(
                "TOOL_GET_ISSUE_DESCRIPTION",
                "Get details of a specific issue.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string" },
                    "repo": { "type": "string" },
                    "issue_number": { "type": "integer" }
                },
                "required": ["owner", "repo", "issue_number"]
            })),
            read_annotations(),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: GetIssueInput = parse_args("get_issue", invocation.arguments)?;
                let path = format!(
                    "repos/{}/{}/issues/{}",
                    input.owner, input.repo, input.issue_number
                );

                let client = manager.rest(&invocation.claims);
                match client.get_json(&path, &[]).await {
                    Ok(value) => json_result(&value),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct ListIssuesInput {
    owner: String,
    repo: String,
    #[serde(default = "default_issue_state")]
    state: String,
}

fn default_issue_state() -> String {
    "open".to_owned()
}

fn list_issues(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::read(
        tool_definition(
            "list_issues",
            t(
                "TOOL_LIST_ISSUES_DESCRIPTION",
                "List issues in a repository.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string" },
                    "repo": { "type": "string" },
                    "state": { "type": "string", "enum": ["open", "closed", "all"], "default": "open" }
                },
                "required": ["owner", "repo"]
            })),
            read_annotations(),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: ListIssuesInput = parse_args("list_issues", invocation.arguments)?;
                let path = format!("repos/{}/{}/issues", input.owner, input.repo);

                let client = manager.rest(&invocation.claims);
                match client.get_json(&path, &[("state", input.state)]).await {
                    Ok(value) => json_result(&value),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct CreateIssueInput {
    owner: String,
    repo: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
}

fn create_issue(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::write(
        tool_definition(
            "create_issue",
            t(
                "TOOL_CREATE_ISSUE_DESCRIPTION",
                "Create a new issue in a repository.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string" },
                    "repo": { "type": "string" },
                    "title": { "type": "string" },
                    "body": { "type": "string" }
                },
                "required": ["owner", "repo", "title"]
            })),
            write_annotations(false),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: CreateIssueInput = parse_args("create_issue", invocation.arguments)?;
                let path = format!("repos/{}/{}/issues", input.owner, input.repo);
                let body = json!({ "title": input.title, "body": input.body });

                let client = manager.rest(&invocation.claims);
                match client.post_json(&path, &body).await {
                    Ok(value) => json_result(&value),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct GetPullRequestInput {
    owner: String,
    repo: String,
    pull_number: u64,
}

fn get_pull_request(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::read(
        tool_definition(
            "get_pull_request",
            t(
                "TOOL_GET_PULL_REQUEST_DESCRIPTION",
                "Get details of a specific pull request.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string" },
                    "repo": { "type": "string" },
                    "pull_number": { "type": "integer" }
                },
                "required": ["owner", "repo", "pull_number"]
            })),
            read_annotations(),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: GetPullRequestInput =
                    parse_args("get_pull_request", invocation.arguments)?;
                let path = format!(
                    "repos/{}/{}/pulls/{}",
                    input.owner, input.repo, input.pull_number
                );

                let client = manager.rest(&invocation.claims);
                match client.get_json(&path, &[]).await {
                    Ok(value) => json_result(&value),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct MergePullRequestInput {
    owner: String,
    repo: String,
    pull_number: u64,
    #[serde(default)]
    commit_title: Option<String>,
    #[serde(default)]
    merge_method: Option<String>,
}

fn merge_pull_request(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::write(
        tool_definition(
            "merge_pull_request",
            t(
                "TOOL_MERGE_PULL_REQUEST_DESCRIPTION",
                "Merge a pull request.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string" },
                    "repo": { "type": "string" },
                    "pull_number": { "type": "integer" },
                    "commit_title": { "type": "string" },
                    "merge_method": { "type": "string", "enum": ["merge", "squash", "rebase"] }
                },
                "required": ["owner", "repo", "pull_number"]
            })),
            write_annotations(true),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: MergePullRequestInput =
                    parse_args("merge_pull_request", invocation.arguments)?;
                let path = format!(
                    "repos/{}/{}/pulls/{}/merge",
                    input.owner, input.repo, input.pull_number
                );
                let body = json!({
                    "commit_title": input.commit_title,
                    "merge_method": input.merge_method,
                });

                let client = manager.rest(&invocation.claims);
                match client.put_json(&path, &body).await {
                    Ok(value) => json_result(&value),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}

#[derive(Debug, serde::Deserialize)]
struct ListDiscussionsInput {
    owner: String,
    repo: String,
    #[serde(default = "default_discussion_count")]
    first: u32,
}

fn default_discussion_count() -> u32 {
    30
}

const LIST_DISCUSSIONS_QUERY: &str = "\
query($owner: String!, $repo: String!, $first: Int!) {
  repository(owner: $owner, name: $repo) {
    discussions(first: $first, orderBy: { field: CREATED_AT, direction: DESC }) {
      nodes { number title createdAt category { name } author { login } }
    }
  }
}";

fn list_discussions(manager: &Arc<ClientManager>, t: &Translator) -> ServerTool {
    let manager = Arc::clone(manager);
    ServerTool::read(
        tool_definition(
            "list_discussions",
            t(
                "TOOL_LIST_DISCUSSIONS_DESCRIPTION",
                "List discussions in a repository.",
            ),
            object_schema(json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string" },
                    "repo": { "type": "string" },
                    "first": { "type": "integer", "minimum": 1, "maximum": 100, "default": 30 }
                },
                "required": ["owner", "repo"]
            })),
            read_annotations(),
        ),
        move |invocation| {
            let manager = Arc::clone(&manager);
            Box::pin(async move {
                let input: ListDiscussionsInput =
                    parse_args("list_discussions", invocation.arguments)?;
                let variables = json!({
                    "owner": input.owner,
                    "repo": input.repo,
                    "first": input.first,
                });

                let client = manager.graphql(&invocation.claims);
                match client.query(LIST_DISCUSSIONS_QUERY, variables).await {
                    Ok(data) => json_result(&data),
                    Err(err) => Ok(api_failure(&invocation.errors, &err)),
                }
            })
        },
    )
}
