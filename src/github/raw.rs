//! Raw content client, composed over the REST client.

use std::sync::Arc;

use reqwest::Url;

use super::client::RestClient;
use crate::{AppError, Result};

/// Client for fetching file contents from the raw-content host.
///
/// Defined purely in terms of a [`RestClient`]: it reuses its
/// credential and identifying string and only contributes the
/// raw-content base URL. It has no credential logic of its own.
#[derive(Debug, Clone)]
pub struct RawClient {
    rest: Arc<RestClient>,
    raw_url: Url,
}

impl RawClient {
    pub(crate) fn new(rest: Arc<RestClient>, raw_url: Url) -> Self {
        Self { rest, raw_url }
    }

    /// Raw content base URL this client targets.
    #[must_use]
    pub fn raw_url(&self) -> &Url {
        &self.raw_url
    }

    /// The REST client whose credential scope this client inherits.
    #[must_use]
    pub fn rest(&self) -> &Arc<RestClient> {
        &self.rest
    }

    fn content_url(&self, owner: &str, repo: &str, git_ref: &str, path: &str) -> Result<Url> {
        let joined = format!("{owner}/{repo}/{git_ref}/{}", path.trim_start_matches('/'));
        self.raw_url
            .join(&joined)
            .map_err(|err| AppError::Config(format!("invalid raw content path {joined}: {err}")))
    }

    /// Fetch the contents of `path` at `git_ref`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` on transport failures or non-success
    /// responses.
    pub async fn fetch_content(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<String> {
        let url = self.content_url(owner, repo, git_ref, path)?;
        self.rest.get_text(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apihost::parse_api_host;
    use crate::github::{ClientManager, RequestClaims};

    #[allow(clippy::unwrap_used)]
    fn raw_client() -> RawClient {
        let host = parse_api_host("").unwrap();
        let manager = ClientManager::new(host, "tok".into(), "1.0.0").unwrap();
        manager.raw(&RequestClaims::default())
    }

    #[test]
    fn content_url_joins_segments() {
        let raw = raw_client();
        #[allow(clippy::unwrap_used)]
        let url = raw
            .content_url("acme", "widgets", "main", "src/lib.rs")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/acme/widgets/main/src/lib.rs"
        );
    }

    #[test]
    fn content_url_strips_leading_slash() {
        let raw = raw_client();
        #[allow(clippy::unwrap_used)]
        let url = raw.content_url("acme", "widgets", "v1.2", "/README.md").unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/acme/widgets/v1.2/README.md"
        );
    }
}
