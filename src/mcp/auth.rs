//! Request-scoped credential extraction.
//!
//! The streamable HTTP transport stores the inbound request head in the
//! MCP request extensions. When an `Authorization: Bearer` header is
//! present its token overrides the process-wide default for exactly that
//! tool call. Stdio requests carry no HTTP head and always fall back to
//! the default credential.

use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rmcp::service::{RequestContext, RoleServer};

use crate::github::RequestClaims;

/// Pull the token out of an `Authorization` header value.
///
/// Only the `Bearer` scheme is honored; anything else yields `None`.
#[must_use]
pub fn bearer_token(header: &str) -> Option<String> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// Derive the claims for one tool call from its request context.
#[must_use]
pub fn claims_from_context(context: &RequestContext<RoleServer>) -> RequestClaims {
    let token = context
        .extensions
        .get::<Parts>()
        .and_then(|parts| parts.headers.get(AUTHORIZATION))
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    RequestClaims { token }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_yields_token() {
        assert_eq!(
            bearer_token("Bearer ghp_abc123"),
            Some("ghp_abc123".to_owned())
        );
    }

    #[test]
    fn non_bearer_scheme_is_ignored() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("token ghp_abc123"), None);
    }

    #[test]
    fn empty_bearer_value_is_ignored() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer   "), None);
    }

    #[test]
    fn lowercase_scheme_is_not_accepted() {
        assert_eq!(bearer_token("bearer ghp_abc123"), None);
    }
}
