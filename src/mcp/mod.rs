//! MCP protocol surface: handler, transports, and request-scoped auth.

pub mod auth;
pub mod dynamic;
pub mod handler;
pub mod http;
pub mod iolog;
pub mod server;
pub mod transport;

pub use handler::GatewayServer;
pub use server::build_gateway;
