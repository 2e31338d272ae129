//! MCP server handler implementation.
//!
//! Exposes four tools: `run_command`, `start_kali_container`,
//! `stop_kali_container` and `get_container_status`. Unknown tool names are
//! rejected by the router with a method-not-found error; daemon failures
//! surface as MCP internal errors; deny-listed commands come back as
//! error-marked tool results without the daemon ever being contacted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bollard::{Docker, API_DEFAULT_VERSION};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use tracing::{debug, info, warn};

use crate::container::{ContainerConfig, ContainerManager, StopOutcome};
use crate::error::{ContainerError, ServerError};
use crate::exec::{CommandResult, ExecRunner};
use crate::security::{self, Validation};

/// Time granted to the best-effort container stop on interrupt.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Connection timeout for the typed daemon client, in seconds.
const DOCKER_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RunCommandRequest {
    /// Shell command to execute inside the Kali Linux container.
    pub command: String,
}

/// The MCP server bridging tool calls to the managed Kali container.
#[derive(Clone)]
pub struct ZadeServer {
    manager: Arc<ContainerManager>,
    runner: ExecRunner,
    tool_router: ToolRouter<Self>,
}

fn internal_error(e: impl std::fmt::Display) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

/// Renders one execution result as the tool's text block.
fn format_command_result(command: &str, result: &CommandResult) -> String {
    format!(
        "Command: {command}\nExit code: {}\n\nStandard output:\n{}\n\nStandard error:\n{}",
        result.exit_code,
        if result.stdout.is_empty() {
            "(empty)"
        } else {
            &result.stdout
        },
        if result.stderr.is_empty() {
            "(none)"
        } else {
            &result.stderr
        },
    )
}

const NOT_FOUND_TEXT: &str =
    "No Kali Linux container found. Use 'start_kali_container' to create one.";

#[tool_router]
impl ZadeServer {
    /// Creates a server over an existing manager and exec runner.
    #[must_use]
    pub fn new(manager: Arc<ContainerManager>, runner: ExecRunner) -> Self {
        Self {
            manager,
            runner,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Execute a shell command inside the managed Kali Linux container and return its exit code, stdout and stderr"
    )]
    async fn run_command(
        &self,
        Parameters(RunCommandRequest { command }): Parameters<RunCommandRequest>,
    ) -> Result<CallToolResult, McpError> {
        if command.trim().is_empty() {
            return Err(McpError::invalid_params(
                "the 'command' parameter is required",
                None,
            ));
        }

        // Classification gates execution: a deny match never reaches the daemon.
        if let Validation::Denied { warning } = security::validate_command(&command) {
            return Ok(CallToolResult::error(vec![Content::text(format!(
                "WARNING: {warning}\n\nExecution was skipped. If this command must run anyway, contact the system operator."
            ))]));
        }

        let container = self.manager.resolve().await.map_err(internal_error)?;
        let result = self
            .runner
            .run(&container, &command)
            .await
            .map_err(internal_error)?;

        let text = format_command_result(&command, &result);
        Ok(if result.success() {
            CallToolResult::success(vec![Content::text(text)])
        } else {
            CallToolResult::error(vec![Content::text(text)])
        })
    }

    #[tool(description = "Start or create the managed Kali Linux container")]
    async fn start_kali_container(&self) -> Result<CallToolResult, McpError> {
        let container = self.manager.resolve().await.map_err(internal_error)?;
        let config = self.manager.config();

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Kali Linux container is running (id {}).\n\n\
             Security: privileged mode, all capabilities, seccomp unconfined\n\
             Mount: host {} -> {}\n\
             Working directory: {}",
            container.short_id(),
            config.host_mount,
            config.container_mount,
            config.working_dir,
        ))]))
    }

    #[tool(description = "Stop and remove the managed Kali Linux container")]
    async fn stop_kali_container(&self) -> Result<CallToolResult, McpError> {
        let outcome = self.manager.stop().await.map_err(internal_error)?;

        let text = match outcome {
            StopOutcome::Removed => "Kali Linux container stopped and removed.",
            StopOutcome::NotFound => NOT_FOUND_TEXT,
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get the status of the managed Kali Linux container")]
    async fn get_container_status(&self) -> Result<CallToolResult, McpError> {
        let status = self.manager.status().await.map_err(internal_error)?;

        let text = match status {
            Some(status) => format!(
                "Kali Linux container status:\n\n\
                 ID:      {}\n\
                 Name:    {}\n\
                 State:   {}\n\
                 Image:   {}\n\
                 Created: {}\n\
                 Ports:   {}",
                status.id, status.name, status.state, status.image, status.created, status.ports,
            ),
            None => String::from(NOT_FOUND_TEXT),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for ZadeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Zade - bridge to a managed Kali Linux container. Use run_command to \
                 execute shell commands inside the container; it is created on first \
                 use. start/stop/status tools manage the container lifecycle."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Runs the MCP server over stdio until shutdown.
///
/// On interrupt, a best-effort container stop is attempted within a bounded
/// grace period before the process exits; cleanup past the grace period is
/// abandoned.
///
/// # Errors
///
/// Returns an error if the daemon connection, server initialization or
/// transport fails.
pub async fn run(config: ContainerConfig, skip_checks: bool) -> crate::error::Result<()> {
    let socket_path = config.socket_path.clone();
    let docker = Docker::connect_with_socket(
        &socket_path.to_string_lossy(),
        DOCKER_TIMEOUT_SECS,
        API_DEFAULT_VERSION,
    )
    .map_err(ContainerError::Connect)?;

    if skip_checks {
        warn!("Skipping Docker daemon preflight check (--skip-checks)");
    } else {
        docker.ping().await.map_err(ContainerError::Connect)?;
        match docker.version().await {
            Ok(version) => info!(
                docker_version = version.version.as_deref().unwrap_or("unknown"),
                "Docker daemon reachable"
            ),
            Err(e) => warn!(error = %e, "Daemon reachable but version query failed"),
        }
    }

    let manager = Arc::new(ContainerManager::new(docker.clone(), config));
    let runner = ExecRunner::new(docker, socket_path);
    let server = ZadeServer::new(Arc::clone(&manager), runner);

    debug!("Using stdio transport");
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| ServerError::InitializationFailed(e.to_string()))?;

    info!("Server initialized, waiting for requests");

    tokio::select! {
        result = service.waiting() => {
            result.map_err(|e| ServerError::Transport(e.to_string()))?;
            info!("Server shutdown complete");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, stopping managed container");
            match tokio::time::timeout(SHUTDOWN_GRACE, manager.stop()).await {
                Ok(Ok(StopOutcome::Removed)) => info!("Managed container stopped and removed"),
                Ok(Ok(StopOutcome::NotFound)) => info!("No managed container to stop"),
                Ok(Err(e)) => warn!(error = %e, "Failed to stop managed container during shutdown"),
                Err(_) => warn!("Shutdown grace period elapsed before container stop completed"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerConfig;

    /// A server wired against a socket path that does not exist. Tool calls
    /// that touch the daemon fail; calls that short-circuit earlier succeed.
    fn offline_server() -> ZadeServer {
        let socket = "/nonexistent/docker.sock";
        let docker = Docker::connect_with_socket(socket, 5, API_DEFAULT_VERSION)
            .expect("client construction is offline");
        let manager = Arc::new(ContainerManager::new(
            docker.clone(),
            ContainerConfig::default(),
        ));
        let runner = ExecRunner::new(docker, socket);
        ZadeServer::new(manager, runner)
    }

    #[tokio::test]
    async fn test_denied_command_never_reaches_the_daemon() {
        let server = offline_server();

        // Against a nonexistent socket, any daemon contact would error out;
        // a deny-listed command must instead return a warning result.
        let result = server
            .run_command(Parameters(RunCommandRequest {
                command: String::from("rm -rf /"),
            }))
            .await
            .expect("classification must not raise a protocol error");

        assert_eq!(result.is_error, Some(true));
        let text = format!("{:?}", result.content);
        assert!(text.contains("rm -rf /"), "warning should name the command");
    }

    #[tokio::test]
    async fn test_empty_command_is_invalid_params() {
        let server = offline_server();

        let result = server
            .run_command(Parameters(RunCommandRequest {
                command: String::from("   "),
            }))
            .await;

        assert!(result.is_err(), "empty command must be invalid-params");
    }

    #[tokio::test]
    async fn test_valid_command_attempts_execution() {
        let server = offline_server();

        // A safe command proceeds to container resolution, which fails
        // against the nonexistent socket as an internal error.
        let result = server
            .run_command(Parameters(RunCommandRequest {
                command: String::from("echo hello"),
            }))
            .await;

        assert!(result.is_err(), "daemon failure surfaces as an error");
    }

    #[test]
    fn test_format_command_result_includes_all_blocks() {
        let result = CommandResult {
            exit_code: 0,
            stdout: String::from("hello"),
            stderr: String::new(),
        };

        let text = format_command_result("echo hello", &result);
        assert!(text.contains("Command: echo hello"));
        assert!(text.contains("Exit code: 0"));
        assert!(text.contains("hello"));
        assert!(text.contains("(none)"));
    }

    #[test]
    fn test_format_command_result_empty_stdout_placeholder() {
        let result = CommandResult {
            exit_code: 2,
            stdout: String::new(),
            stderr: String::from("boom"),
        };

        let text = format_command_result("false", &result);
        assert!(text.contains("(empty)"));
        assert!(text.contains("boom"));
    }
}
