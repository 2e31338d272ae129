//! Error types for the Zade MCP server.
//!
//! Uses thiserror for deriving std::error::Error and miette for rich diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the application.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Container lifecycle error (list/create/start/stop/remove)
    #[error("Container lifecycle error")]
    #[diagnostic(code(zade::container))]
    Container(#[from] ContainerError),

    /// Command execution error
    #[error("Command execution error")]
    #[diagnostic(code(zade::exec))]
    Exec(#[from] ExecError),

    /// MCP server error
    #[error("MCP server error")]
    #[diagnostic(code(zade::server))]
    Server(#[from] ServerError),
}

/// Errors from the Docker Engine API while managing the container lifecycle.
#[derive(Error, Debug, Diagnostic)]
pub enum ContainerError {
    /// Could not reach the Docker daemon at all
    #[error("Failed to connect to the Docker daemon")]
    #[diagnostic(
        code(zade::container::connect),
        help("Ensure Docker is running and the socket path is correct (--docker-socket)")
    )]
    Connect(#[source] bollard::errors::Error),

    /// A daemon API call against the managed container failed
    #[error("Failed to {operation} container {name}")]
    #[diagnostic(code(zade::container::runtime))]
    Runtime {
        operation: &'static str,
        name: String,
        #[source]
        source: bollard::errors::Error,
    },
}

impl ContainerError {
    /// Wraps a bollard error with the operation that produced it.
    pub fn runtime(
        operation: &'static str,
        name: impl Into<String>,
        source: bollard::errors::Error,
    ) -> Self {
        Self::Runtime {
            operation,
            name: name.into(),
            source,
        }
    }
}

/// Errors raised while running a command through an exec channel.
///
/// The caller gets either a complete `CommandResult` or one of these; a
/// partial result is never returned.
#[derive(Error, Debug, Diagnostic)]
pub enum ExecError {
    /// Opening the exec channel failed
    #[error("Failed to open exec channel")]
    #[diagnostic(code(zade::exec::create))]
    Create(#[source] bollard::errors::Error),

    /// The exec start request could not be built
    #[error("Failed to build exec start request: {0}")]
    #[diagnostic(code(zade::exec::request))]
    Request(String),

    /// The exec start request could not be sent over the Docker socket
    #[error("Failed to start exec stream: {0}")]
    #[diagnostic(code(zade::exec::start))]
    Start(String),

    /// The daemon rejected the exec start call
    #[error("Exec start returned HTTP status {status}")]
    #[diagnostic(
        code(zade::exec::status),
        help("The daemon accepted exec creation but refused to start it; check daemon logs")
    )]
    UnexpectedStatus { status: u16 },

    /// The multiplexed output stream failed mid-read
    #[error("Exec output stream failed: {0}")]
    #[diagnostic(code(zade::exec::stream))]
    Stream(String),

    /// Post-completion status inspection failed
    #[error("Failed to inspect exec status")]
    #[diagnostic(code(zade::exec::inspect))]
    Inspect(#[source] bollard::errors::Error),
}

/// Errors related to the MCP server itself.
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    /// Server failed to initialize
    #[error("Server initialization failed: {0}")]
    #[diagnostic(code(zade::server::init))]
    InitializationFailed(String),

    /// Transport error
    #[error("Transport error: {0}")]
    #[diagnostic(code(zade::server::transport))]
    Transport(String),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
