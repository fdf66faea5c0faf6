//! Authenticated GraphQL client for the GitHub API.

use reqwest::header::USER_AGENT;
use reqwest::Url;
use serde_json::{json, Value};

use super::Identity;
use crate::{AppError, Result};

/// GraphQL client bound to one endpoint and one credential.
///
/// The outbound chain is bearer authorization plus the identifying
/// string, matching the REST client's header discipline.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
    identity: Identity,
}

impl GraphqlClient {
    pub(crate) fn new(
        http: reqwest::Client,
        endpoint: Url,
        token: String,
        identity: Identity,
    ) -> Self {
        Self {
            http,
            endpoint,
            token,
            identity,
        }
    }

    /// GraphQL endpoint this client targets.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Credential the client authenticates with.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Identifying string that would be attached to the next request.
    #[must_use]
    pub fn user_agent(&self) -> String {
        self.identity.resolve()
    }

    /// Execute a query and return its `data` payload.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` on transport failures, non-success
    /// responses, or a non-empty GraphQL `errors` array.
    pub async fn query(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(USER_AGENT, self.identity.resolve())
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Api(format!("{status}: {}", body.trim())));
        }

        let mut payload: Value = response.json().await?;
        if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let joined = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(AppError::Api(format!("graphql: {joined}")));
            }
        }

        Ok(payload
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }
}
