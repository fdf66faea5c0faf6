//! Credential-scoped GitHub client construction.
//!
//! [`ClientManager`] owns the resolved endpoint set, the server-wide
//! default credential, and the shared identifying string. Every tool
//! invocation asks it for a client; a request-scoped token yields a
//! fresh client, no token yields the shared default.

use std::sync::{Arc, PoisonError, RwLock};

use crate::apihost::ApiHost;
use crate::{AppError, Result};

pub mod client;
pub mod graphql;
pub mod raw;
pub mod tools;

pub use client::RestClient;
pub use graphql::GraphqlClient;
pub use raw::RawClient;

/// Product name used in the outbound identifying string.
pub const PRODUCT_NAME: &str = "github-mcp-gateway";

/// Compose the outbound identifying string from server and caller identity.
#[must_use]
pub fn compose_user_agent(version: &str, client_name: &str, client_version: &str) -> String {
    format!("{PRODUCT_NAME}/{version} ({client_name}/{client_version})")
}

/// Request-scoped credential override extracted by the transport layer.
///
/// Set at most once per inbound request (HTTP: from the authorization
/// header; stdio: always empty) and read when clients are built.
#[derive(Debug, Clone, Default)]
pub struct RequestClaims {
    /// Bearer token carried by this request, if any.
    pub token: Option<String>,
}

impl RequestClaims {
    fn override_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

/// How a client resolves its identifying string.
///
/// The shared variant reads the process-wide slot at send time, so the
/// one-per-session handshake mutation reaches the default clients. The
/// pinned variant freezes a snapshot at construction time, so clients
/// built for one HTTP request never observe a later handshake from a
/// concurrent session.
#[derive(Debug, Clone)]
pub enum Identity {
    /// Reads the shared slot on every request.
    Shared(Arc<RwLock<String>>),
    /// Frozen snapshot taken at construction.
    Pinned(String),
}

impl Identity {
    /// The identifying string to attach to the next outbound request.
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::Shared(slot) => slot
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            Self::Pinned(value) => value.clone(),
        }
    }
}

/// Factory for correctly-scoped REST, GraphQL, and raw-content clients.
pub struct ClientManager {
    host: ApiHost,
    default_token: String,
    version: String,
    identity: Arc<RwLock<String>>,
    http: reqwest::Client,
    default_rest: Arc<RestClient>,
    default_graphql: Arc<GraphqlClient>,
}

impl ClientManager {
    /// Build the manager and its shared default clients.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(host: ApiHost, default_token: String, version: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;

        let identity = Arc::new(RwLock::new(format!("{PRODUCT_NAME}/{version}")));

        let default_rest = Arc::new(RestClient::new(
            http.clone(),
            &host,
            default_token.clone(),
            Identity::Shared(Arc::clone(&identity)),
        ));
        let default_graphql = Arc::new(GraphqlClient::new(
            http.clone(),
            host.graphql_url.clone(),
            default_token.clone(),
            Identity::Shared(Arc::clone(&identity)),
        ));

        Ok(Self {
            host,
            default_token,
            version: version.to_owned(),
            identity,
            http,
            default_rest,
            default_graphql,
        })
    }

    /// The resolved endpoint set all clients inherit.
    #[must_use]
    pub fn host(&self) -> &ApiHost {
        &self.host
    }

    /// Install the composed identifying string after the initialize
    /// handshake. Default clients pick it up on their next request;
    /// request-scoped clients built before this call keep their
    /// snapshot.
    pub fn set_client_identity(&self, client_name: &str, client_version: &str) {
        *self
            .identity
            .write()
            .unwrap_or_else(PoisonError::into_inner) =
            compose_user_agent(&self.version, client_name, client_version);
    }

    /// Snapshot of the current identifying string.
    #[must_use]
    pub fn current_identity(&self) -> String {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// REST client scoped to the request's claims.
    ///
    /// A present, non-empty claims token yields a new client carrying
    /// that token; otherwise the shared default client is returned
    /// unchanged (identity-equal across calls).
    #[must_use]
    pub fn rest(&self, claims: &RequestClaims) -> Arc<RestClient> {
        match claims.override_token() {
            Some(token) => Arc::new(RestClient::new(
                self.http.clone(),
                &self.host,
                token.to_owned(),
                Identity::Pinned(self.current_identity()),
            )),
            None => Arc::clone(&self.default_rest),
        }
    }

    /// GraphQL client scoped to the request's claims.
    #[must_use]
    pub fn graphql(&self, claims: &RequestClaims) -> Arc<GraphqlClient> {
        match claims.override_token() {
            Some(token) => Arc::new(GraphqlClient::new(
                self.http.clone(),
                self.host.graphql_url.clone(),
                token.to_owned(),
                Identity::Pinned(self.current_identity()),
            )),
            None => Arc::clone(&self.default_graphql),
        }
    }

    /// Raw-content client scoped to the request's claims.
    ///
    /// Defined purely in terms of [`Self::rest`] plus the raw base URL.
    #[must_use]
    pub fn raw(&self, claims: &RequestClaims) -> RawClient {
        RawClient::new(self.rest(claims), self.host.raw_url.clone())
    }

    /// Default credential, used when a request carries no override.
    #[must_use]
    pub fn default_token(&self) -> &str {
        &self.default_token
    }
}
