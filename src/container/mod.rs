//! Lifecycle management for the single managed Kali container.
//!
//! The container is addressed by a fixed, well-known name and created with a
//! fixed configuration: privileged mode, all capabilities, seccomp disabled,
//! and a bind mount from the host's `/tmp` into `/host_tmp`. See
//! [`ContainerConfig`] for the constants and [`ContainerManager`] for the
//! find-or-create / stop / status operations.

mod config;
mod manager;

pub use config::{ContainerConfig, CONTAINER_NAME, DEFAULT_DOCKER_SOCKET, DEFAULT_IMAGE};
pub use manager::{ContainerManager, ContainerStatus, ManagedContainer, StopOutcome};
