#![forbid(unsafe_code)]

//! GitHub MCP gateway library.
//!
//! Exposes GitHub's REST, GraphQL, and raw content APIs as MCP tools
//! over stdio or streamable HTTP, with per-request credential scoping
//! and runtime toolset discovery.

pub mod apihost;
pub mod config;
pub mod errors;
pub mod github;
pub mod mcp;
pub mod toolsets;
pub mod translations;

pub use errors::{AppError, Result};
