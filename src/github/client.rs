//! Authenticated REST client for the GitHub API.

use reqwest::header::USER_AGENT;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;

use super::Identity;
use crate::apihost::ApiHost;
use crate::{AppError, Result};

/// REST client bound to one endpoint set and one credential.
///
/// The identifying string is either pinned at construction (request-scoped
/// clients) or read from the shared slot at send time (the process-wide
/// default client).
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    rest_url: Url,
    upload_url: Url,
    token: String,
    identity: Identity,
}

impl RestClient {
    pub(crate) fn new(
        http: reqwest::Client,
        host: &ApiHost,
        token: String,
        identity: Identity,
    ) -> Self {
        Self {
            http,
            rest_url: host.rest_url.clone(),
            upload_url: host.upload_url.clone(),
            token,
            identity,
        }
    }

    /// REST API base URL this client targets.
    #[must_use]
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// Asset upload base URL this client targets.
    #[must_use]
    pub fn upload_url(&self) -> &Url {
        &self.upload_url
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

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.rest_url
            .join(path)
            .map_err(|err| AppError::Config(format!("invalid REST path {path}: {err}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(USER_AGENT, self.identity.resolve())
            .bearer_auth(&self.token)
    }

    /// GET a REST resource as JSON.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` on transport failures or non-success
    /// responses, `AppError::Config` if `path` is not joinable.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::GET, url).query(query).send().await?;
        decode_json(response).await
    }

    /// POST a JSON body to a REST resource.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::get_json`].
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        decode_json(response).await
    }

    /// PUT a JSON body to a REST resource.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::get_json`].
    pub async fn put_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::PUT, url).json(body).send().await?;
        decode_json(response).await
    }

    /// GET an absolute URL as text through this client's credential and
    /// identifying string. Used by the raw-content client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` on transport failures or non-success
    /// responses.
    pub async fn get_text(&self, url: Url) -> Result<String> {
        let response = self.request(Method::GET, url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status, &body))
        }
    }
}

async fn decode_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    let mut detail = body.trim().to_owned();
    if detail.len() > 200 {
        let boundary = detail
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= 200)
            .last()
            .unwrap_or(0);
        detail.truncate(boundary);
    }
    AppError::Api(format!("{status}: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apihost::parse_api_host;
    use crate::github::Identity;

    #[allow(clippy::unwrap_used)]
    fn client() -> RestClient {
        let host = parse_api_host("").unwrap();
        RestClient::new(
            reqwest::Client::new(),
            &host,
            "tok".into(),
            Identity::Pinned("agent/1".into()),
        )
    }

    #[test]
    fn client_targets_the_resolved_endpoints() {
        let client = client();
        assert_eq!(client.rest_url().as_str(), "https://api.github.com/");
        assert_eq!(client.upload_url().as_str(), "https://uploads.github.com/");
    }

    #[test]
    fn endpoint_joins_relative_paths() {
        let client = client();
        #[allow(clippy::unwrap_used)]
        let url = client.endpoint("repos/acme/widgets/issues/7").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/widgets/issues/7"
        );
    }

    #[test]
    fn status_error_includes_status_and_body() {
        let err = status_error(StatusCode::UNPROCESSABLE_ENTITY, "validation failed");
        match err {
            AppError::Api(msg) => {
                assert!(msg.contains("422"), "got: {msg}");
                assert!(msg.contains("validation failed"), "got: {msg}");
            }
            other => panic!("expected api error, got: {other}"),
        }
    }

    #[test]
    fn status_error_truncates_long_bodies() {
        let body = "x".repeat(5000);
        let AppError::Api(msg) = status_error(StatusCode::BAD_GATEWAY, &body) else {
            panic!("expected api error");
        };
        assert!(msg.len() < 300, "got {} bytes", msg.len());
    }
}
