//! Zade MCP Server - Entry Point
//!
//! This is the main entry point for the MCP server binary.

use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

use zade::container::{ContainerConfig, DEFAULT_DOCKER_SOCKET};
use zade::server;

/// Zade - MCP bridge to a managed Kali Linux container.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the Docker daemon unix socket
    #[arg(long, env = "ZADE_DOCKER_SOCKET", default_value = DEFAULT_DOCKER_SOCKET)]
    docker_socket: PathBuf,

    /// Skip the Docker daemon preflight check
    #[arg(long, default_value = "false")]
    skip_checks: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    // MCP requires that logs go to stderr (stdout is for JSON-RPC)
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Zade MCP Server v{}", env!("CARGO_PKG_VERSION"));

    if args.skip_checks {
        warn!("Skipping Docker daemon preflight check (--skip-checks)");
        warn!("Tool calls will fail at first use if the daemon is unreachable");
    }

    let config = ContainerConfig::default().with_socket_path(args.docker_socket);

    server::run(config, args.skip_checks).await.into_diagnostic()
}
