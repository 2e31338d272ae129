//! Command execution through a Docker exec channel.
//!
//! The exec channel is created through the typed daemon API, but the start
//! call is issued as a raw HTTP request over the daemon's unix socket so the
//! undecoded multiplexed byte stream can be consumed chunk by chunk and fed
//! to [`StreamDemux`]. After the stream ends, the channel is inspected for
//! its terminal exit code.
//!
//! There is no per-command timeout: a command that hangs inside the
//! container holds the calling task open until the daemon closes the stream.

use std::path::PathBuf;

use bollard::exec::CreateExecOptions;
use bollard::Docker;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::Client;
use hyperlocal::{UnixClientExt, UnixConnector, Uri as HyperlocalUri};
use serde_json::json;
use tracing::{debug, instrument};

use super::demux::StreamDemux;
use crate::container::ManagedContainer;
use crate::error::ExecError;

/// Result of one command execution, complete or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code of the command; 0 when the daemon omits it.
    pub exit_code: i32,
    /// Complete standard output, trimmed of surrounding whitespace.
    pub stdout: String,
    /// Complete standard error, trimmed of surrounding whitespace.
    pub stderr: String,
}

impl CommandResult {
    /// Returns `true` if the command exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Exit code reported by the daemon; an omitted code counts as success.
fn exit_code_or_default(exit_code: Option<i64>) -> i32 {
    exit_code.unwrap_or(0) as i32
}

/// Opens exec channels against the managed container and drains them.
#[derive(Debug, Clone)]
pub struct ExecRunner {
    docker: Docker,
    socket_path: PathBuf,
}

impl ExecRunner {
    /// Creates a runner using the given daemon client and unix socket path.
    ///
    /// Both must address the same daemon: the typed client creates and
    /// inspects the exec channel, the socket carries the raw output stream.
    #[must_use]
    pub fn new(docker: Docker, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            docker,
            socket_path: socket_path.into(),
        }
    }

    /// Runs a shell command inside the container and returns its result.
    ///
    /// The command is wrapped as `/bin/bash -c "<command>"` with both output
    /// streams attached and no input. The call blocks until the stream ends.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] if the channel cannot be opened, the stream
    /// fails, or the terminal status cannot be inspected. No partial result
    /// is ever returned.
    #[instrument(skip(self, container), fields(container = %container.short_id()))]
    pub async fn run(
        &self,
        container: &ManagedContainer,
        command: &str,
    ) -> Result<CommandResult, ExecError> {
        debug!(command = %command, "Opening exec channel");

        let exec = self
            .docker
            .create_exec(
                container.id(),
                CreateExecOptions {
                    cmd: Some(vec!["/bin/bash", "-c", command]),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(ExecError::Create)?;

        let (stdout, stderr) = self.drain_exec_stream(&exec.id).await?;

        let inspect = self
            .docker
            .inspect_exec(&exec.id)
            .await
            .map_err(ExecError::Inspect)?;
        let exit_code = exit_code_or_default(inspect.exit_code);

        debug!(exit_code, "Command completed");
        Ok(CommandResult {
            exit_code,
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        })
    }

    /// Starts the exec channel over the raw socket and consumes the
    /// multiplexed response body to completion.
    async fn drain_exec_stream(&self, exec_id: &str) -> Result<(String, String), ExecError> {
        let client: Client<UnixConnector, Full<Bytes>> = Client::unix();
        let uri: Uri =
            HyperlocalUri::new(&self.socket_path, &format!("/exec/{exec_id}/start")).into();

        let payload = json!({ "Detach": false, "Tty": false });
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(payload.to_string())))
            .map_err(|e| ExecError::Request(e.to_string()))?;

        let response = client
            .request(request)
            .await
            .map_err(|e| ExecError::Start(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExecError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let mut body = response.into_body();
        let mut demux = StreamDemux::new();
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(|e| ExecError::Stream(e.to_string()))?;
            if let Ok(data) = frame.into_data() {
                demux.push_chunk(&data);
            }
        }

        Ok(demux.into_parts())
    }
}
