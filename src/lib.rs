//! Zade - MCP bridge to a managed Kali Linux container.
//!
//! This crate exposes a small set of MCP tools that manage the lifecycle of
//! a single Docker-managed Kali Linux container and run arbitrary shell
//! commands inside it, returning structured results (exit code, stdout,
//! stderr) to a tool-calling agent.
//!
//! The container is created privileged with all capabilities and seccomp
//! disabled; the only pre-execution safeguard is an advisory deny-list
//! check. Run this against hosts you are authorized to use it on.
//!
//! # Example
//!
//! ```no_run
//! use zade::{container::ContainerConfig, server};
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     server::run(ContainerConfig::default(), false)
//!         .await
//!         .map_err(miette::Report::from)
//! }
//! ```

pub mod container;
pub mod error;
pub mod exec;
pub mod security;
pub mod server;

// Re-export commonly used types
pub use container::{ContainerConfig, ContainerManager, ManagedContainer};
pub use error::{Error, Result};
pub use exec::{CommandResult, ExecRunner, StreamDemux};
pub use security::{validate_command, Validation};
