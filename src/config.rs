//! Runner configuration surfaces and toolset selection resolution.

use std::sync::Arc;

use crate::translations::Translator;
use crate::{AppError, Result};

/// Alias a caller may pass instead of an explicit toolset list.
pub const ALL_TOOLSETS: &str = "all";

/// Toolsets enabled when the caller specifies none.
#[must_use]
pub fn default_enabled_toolsets() -> Vec<String> {
    vec![ALL_TOOLSETS.to_owned()]
}

/// Everything needed to build one gateway engine instance.
#[derive(Clone)]
pub struct McpServerConfig {
    /// Server version advertised to clients and used in the
    /// identifying string.
    pub version: String,
    /// GitHub host to target (empty means github.com).
    pub host: String,
    /// Default token used when a request carries no override.
    pub token: String,
    /// Toolsets to enable at startup ("all" is expanded before the
    /// registry sees it).
    pub enabled_toolsets: Vec<String>,
    /// Whether the dynamic meta-toolset is exposed.
    pub dynamic_toolsets: bool,
    /// Whether mutating tools are suppressed.
    pub read_only: bool,
    /// Provider of translated tool descriptions.
    pub translator: Translator,
}

impl McpServerConfig {
    /// Validate startup configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the default token is empty.
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(AppError::Config(
                "a GitHub token is required (set GITHUB_PERSONAL_ACCESS_TOKEN)".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the single-session stdio runner.
#[derive(Clone)]
pub struct StdioServerConfig {
    /// Engine configuration.
    pub server: McpServerConfig,
    /// Mirror every inbound/outbound protocol byte to the log.
    pub enable_command_logging: bool,
    /// Write the collected translation keys to disk after startup.
    pub export_translations: bool,
}

/// Configuration for the multiplexed HTTP runner.
#[derive(Clone)]
pub struct HttpServerConfig {
    /// Engine configuration.
    pub server: McpServerConfig,
    /// Listen port for the streamable HTTP transport.
    pub port: u16,
    /// Write the collected translation keys to disk after startup.
    pub export_translations: bool,
}

/// Resolve the requested toolset names against the catalog.
///
/// The "all" alias is expanded to the full catalog here, before the
/// registry is consulted. Dynamic mode instead drops the alias so the
/// process starts from an explicit subset and grows at runtime.
#[must_use]
pub fn resolve_enabled_toolsets(
    requested: &[String],
    dynamic_toolsets: bool,
    catalog: &[String],
) -> Vec<String> {
    if dynamic_toolsets {
        return requested
            .iter()
            .filter(|name| name.as_str() != ALL_TOOLSETS)
            .cloned()
            .collect();
    }

    if requested.iter().any(|name| name == ALL_TOOLSETS) {
        return catalog.to_vec();
    }

    requested.to_vec()
}

/// A no-op translator for callers that do not override descriptions.
#[must_use]
pub fn null_translator() -> Translator {
    Arc::new(|_key, default| default.to_owned())
}
