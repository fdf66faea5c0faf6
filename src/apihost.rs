//! Deployment endpoint resolution.
//!
//! Turns a single configured GitHub host string into the four absolute
//! base URLs the gateway needs (REST, GraphQL, uploads, raw content),
//! selecting the derivation rule from the deployment topology the host
//! designates.

use reqwest::Url;

use crate::{AppError, Result};

/// Which hosting topology a configured host string designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentKind {
    /// github.com.
    Dotcom,
    /// GitHub Enterprise Cloud (`*.ghe.com`), data-residency hosts.
    EnterpriseCloud,
    /// Self-hosted GitHub Enterprise Server.
    EnterpriseServer,
}

/// Resolved set of service base URLs for one deployment.
///
/// Derived once per process and immutable afterwards. All four URLs
/// share one scheme and one hostname-derivation rule for a given
/// deployment kind.
#[derive(Debug, Clone)]
pub struct ApiHost {
    /// Topology the host string resolved to.
    pub kind: DeploymentKind,
    /// REST API base URL, trailing slash included.
    pub rest_url: Url,
    /// GraphQL endpoint URL.
    pub graphql_url: Url,
    /// Asset upload base URL.
    pub upload_url: Url,
    /// Raw content base URL, trailing slash included.
    pub raw_url: Url,
}

fn parse_derived(step: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|err| AppError::Config(format!("failed to parse {step} URL: {err}")))
}

fn dotcom_host() -> Result<ApiHost> {
    Ok(ApiHost {
        kind: DeploymentKind::Dotcom,
        rest_url: parse_derived("dotcom REST", "https://api.github.com/")?,
        graphql_url: parse_derived("dotcom GraphQL", "https://api.github.com/graphql")?,
        upload_url: parse_derived("dotcom upload", "https://uploads.github.com")?,
        raw_url: parse_derived("dotcom raw", "https://raw.githubusercontent.com/")?,
    })
}

fn ghec_host(url: &Url) -> Result<ApiHost> {
    // Unsecured enterprise cloud would be an error.
    if url.scheme() == "http" {
        return Err(AppError::Config(
            "enterprise cloud host must be https".into(),
        ));
    }

    let hostname = url
        .host_str()
        .ok_or_else(|| AppError::Config(format!("enterprise cloud host has no hostname: {url}")))?;

    Ok(ApiHost {
        kind: DeploymentKind::EnterpriseCloud,
        rest_url: parse_derived("enterprise cloud REST", &format!("https://api.{hostname}/"))?,
        graphql_url: parse_derived(
            "enterprise cloud GraphQL",
            &format!("https://api.{hostname}/graphql"),
        )?,
        upload_url: parse_derived(
            "enterprise cloud upload",
            &format!("https://uploads.{hostname}"),
        )?,
        raw_url: parse_derived("enterprise cloud raw", &format!("https://raw.{hostname}/"))?,
    })
}

fn ghes_host(url: &Url) -> Result<ApiHost> {
    let scheme = url.scheme();
    let hostname = url.host_str().ok_or_else(|| {
        AppError::Config(format!("enterprise server host has no hostname: {url}"))
    })?;

    Ok(ApiHost {
        kind: DeploymentKind::EnterpriseServer,
        rest_url: parse_derived(
            "enterprise server REST",
            &format!("{scheme}://{hostname}/api/v3/"),
        )?,
        graphql_url: parse_derived(
            "enterprise server GraphQL",
            &format!("{scheme}://{hostname}/api/graphql"),
        )?,
        upload_url: parse_derived(
            "enterprise server upload",
            &format!("{scheme}://{hostname}/api/uploads/"),
        )?,
        raw_url: parse_derived(
            "enterprise server raw",
            &format!("{scheme}://{hostname}/raw/"),
        )?,
    })
}

/// Resolve a configured host string into an [`ApiHost`].
///
/// An empty host means github.com. A non-empty host must be an absolute
/// URL with an `http` or `https` scheme; the hostname suffix selects
/// the topology. Ports are not handled: `Url::host_str` drops them
/// during derivation, so development endpoints with explicit ports are
/// unsupported.
///
/// # Errors
///
/// Returns `AppError::Config` for schemeless or unparseable hosts, an
/// `http` enterprise cloud host, or any failure while deriving the
/// four service URLs.
pub fn parse_api_host(host: &str) -> Result<ApiHost> {
    if host.is_empty() {
        return dotcom_host();
    }

    let url = Url::parse(host).map_err(|_| {
        AppError::Config(format!("host must have a scheme (http or https): {host}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Config(format!(
            "host must have a scheme (http or https): {host}"
        )));
    }

    let hostname = url
        .host_str()
        .ok_or_else(|| AppError::Config(format!("could not parse host as URL: {host}")))?;

    if hostname.ends_with("github.com") {
        return dotcom_host();
    }

    if hostname.ends_with("ghe.com") {
        return ghec_host(&url);
    }

    ghes_host(&url)
}
