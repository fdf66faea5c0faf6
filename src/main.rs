#![forbid(unsafe_code)]

//! `github-mcp-gateway` — GitHub MCP gateway server binary.
//!
//! Bootstraps configuration from flags and environment variables, then
//! serves the gateway over stdio or streamable HTTP until a shutdown
//! signal arrives.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use github_mcp_gateway::config::{null_translator, HttpServerConfig, McpServerConfig, StdioServerConfig};
use github_mcp_gateway::mcp::{http, transport};
use github_mcp_gateway::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "github-mcp-gateway", about = "GitHub MCP gateway server", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve a single client over stdin/stdout.
    Stdio(StdioArgs),
    /// Serve multiple clients over streamable HTTP.
    Http(HttpArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// GitHub token used when a request carries no credential override.
    #[arg(
        long,
        env = "GITHUB_PERSONAL_ACCESS_TOKEN",
        hide_env_values = true,
        default_value = ""
    )]
    token: String,

    /// Target GitHub host. Empty means github.com; `*.ghe.com` selects
    /// enterprise cloud; anything else is treated as enterprise server.
    #[arg(long, env = "GITHUB_HOST", default_value = "")]
    gh_host: String,

    /// Comma-separated toolsets to enable at startup ("all" for everything).
    #[arg(
        long,
        env = "GITHUB_TOOLSETS",
        value_delimiter = ',',
        default_value = "all"
    )]
    toolsets: Vec<String>,

    /// Start with no active toolsets and let clients enable them at runtime.
    #[arg(long, env = "GITHUB_DYNAMIC_TOOLSETS")]
    dynamic_toolsets: bool,

    /// Suppress every tool that mutates remote state.
    #[arg(long, env = "GITHUB_READ_ONLY")]
    read_only: bool,

    /// Write the collected translation keys to disk after startup.
    #[arg(long)]
    export_translations: bool,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Append logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl CommonArgs {
    fn server_config(&self) -> McpServerConfig {
        McpServerConfig {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            host: self.gh_host.clone(),
            token: self.token.clone(),
            enabled_toolsets: self.toolsets.clone(),
            dynamic_toolsets: self.dynamic_toolsets,
            read_only: self.read_only,
            // Replaced with the real helper when the transport starts.
            translator: null_translator(),
        }
    }
}

#[derive(Debug, Args)]
struct StdioArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Mirror every inbound and outbound protocol byte to the log.
    #[arg(long, env = "GITHUB_MCP_ENABLE_COMMAND_LOGGING")]
    enable_command_logging: bool,
}

#[derive(Debug, Args)]
struct HttpArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Listen port for the streamable HTTP transport.
    #[arg(long, env = "GITHUB_MCP_PORT", default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let common = match &cli.command {
        Command::Stdio(args) => &args.common,
        Command::Http(args) => &args.common,
    };
    init_tracing(common.log_format, common.log_file.as_deref())?;
    info!("github-mcp-gateway bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_ct.cancel();
    });

    match cli.command {
        Command::Stdio(args) => {
            let config = StdioServerConfig {
                server: args.common.server_config(),
                enable_command_logging: args.enable_command_logging,
                export_translations: args.common.export_translations,
            };
            transport::run_stdio_server(config, ct).await
        }
        Command::Http(args) => {
            let config = HttpServerConfig {
                server: args.common.server_config(),
                port: args.port,
                export_translations: args.common.export_translations,
            };
            http::run_http_server(config, ct).await
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

/// Initialize tracing. Logs go to stderr by default because the stdio
/// transport owns stdout for protocol traffic.
fn init_tracing(log_format: LogFormat, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let init_result = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| {
                    AppError::Config(format!("cannot open log file {}: {err}", path.display()))
                })?;
            let subscriber = fmt()
                .with_env_filter(env_filter)
                .with_writer(Arc::new(file))
                .with_ansi(false);
            match log_format {
                LogFormat::Text => subscriber.try_init(),
                LogFormat::Json => subscriber.json().try_init(),
            }
        }
        None => {
            let subscriber = fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr);
            match log_format {
                LogFormat::Text => subscriber.try_init(),
                LogFormat::Json => subscriber.json().try_init(),
            }
        }
    };

    init_result.map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))
}
