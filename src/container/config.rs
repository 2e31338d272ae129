//! Configuration for the managed Kali container.
//!
//! These are design constants, not request parameters: the MCP tools never
//! accept image names, mount points or privilege flags from the caller. The
//! builder methods exist so tests and the CLI can override individual fields.

use std::path::PathBuf;
use std::time::Duration;

/// Well-known name of the single managed container.
pub const CONTAINER_NAME: &str = "kali-mcp-container";

/// Default image for the managed container.
pub const DEFAULT_IMAGE: &str = "kalilinux/kali-rolling:latest";

/// Default Docker daemon socket path.
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Configuration for the managed container and the daemon connection.
///
/// # Example
///
/// ```
/// use zade::container::ContainerConfig;
/// use std::time::Duration;
///
/// let config = ContainerConfig::default()
///     .with_image("kalilinux/kali-last-release")
///     .with_settle_delay(Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Well-known container name used for find-or-create.
    pub name: String,

    /// Image reference to create the container from.
    pub image: String,

    /// Path to the Docker daemon unix socket.
    pub socket_path: PathBuf,

    /// Host path bind-mounted into the container.
    pub host_mount: String,

    /// In-container mount point for `host_mount`.
    pub container_mount: String,

    /// Working directory for the container's init shell and exec calls.
    pub working_dir: String,

    /// Pause after starting a freshly created container, letting its init
    /// process become ready to accept exec calls.
    pub settle_delay: Duration,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: String::from(CONTAINER_NAME),
            image: String::from(DEFAULT_IMAGE),
            socket_path: PathBuf::from(DEFAULT_DOCKER_SOCKET),
            host_mount: String::from("/tmp"),
            container_mount: String::from("/host_tmp"),
            working_dir: String::from("/root"),
            settle_delay: Duration::from_secs(3),
        }
    }
}

impl ContainerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the well-known container name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Sets the Docker daemon socket path.
    #[must_use]
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Sets the settle delay applied after first start.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}
