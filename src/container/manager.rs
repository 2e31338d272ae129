//! Lifecycle management for the single managed Kali container.
//!
//! The manager owns the process-wide cached handle to the container and is
//! the only component that talks to the daemon's container endpoints. All
//! state transitions go through three operations:
//!
//! - [`ContainerManager::resolve`] — find-or-create, returning a running
//!   container handle. The whole resolution holds an async mutex over the
//!   cached handle, so two concurrent first-use requests cannot both observe
//!   "absent" and race to create the same name.
//! - [`ContainerManager::stop`] — stop and force-remove, clearing the cache.
//!   An absent container is a normal outcome, not an error.
//! - [`ContainerManager::status`] — read-only snapshot with per-field
//!   degradation to `"unknown"` when the daemon omits data.
//!
//! No call here retries; every daemon failure propagates to the caller, and
//! the cached handle is left unchanged on failure.

use std::collections::HashMap;

use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::models::{ContainerSummary, HostConfig, Mount, MountTypeEnum};
use bollard::Docker;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::config::ContainerConfig;
use crate::error::ContainerError;

/// Sentinel for status fields the daemon omitted.
const UNKNOWN: &str = "unknown";

/// Identity handle to the runtime-managed container.
///
/// At most one container with the well-known name exists at any time; this
/// handle is cached process-wide and reused across invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedContainer {
    id: String,
}

impl ManagedContainer {
    fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The opaque runtime identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The identifier truncated to the familiar 12-character display form.
    #[must_use]
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(12)]
    }
}

/// Outcome of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The container was stopped (if running) and removed.
    Removed,
    /// No container with the well-known name exists; nothing to stop.
    NotFound,
}

/// Read-only status snapshot of the managed container.
///
/// Every field degrades to a sentinel value when the daemon omits it; a
/// single missing field never fails the whole call.
#[derive(Debug, Clone)]
pub struct ContainerStatus {
    /// Truncated (12-character) container identifier.
    pub id: String,
    /// Display name, as reported by the daemon.
    pub name: String,
    /// Lifecycle state (`running`, `exited`, ...).
    pub state: String,
    /// Image reference the container was created from.
    pub image: String,
    /// Creation timestamp, formatted as UTC.
    pub created: String,
    /// Port bindings, rendered as JSON, or `"none"`.
    pub ports: String,
}

impl ContainerStatus {
    fn from_summary(summary: &ContainerSummary) -> Self {
        let id = summary
            .id
            .as_deref()
            .map(|id| id[..id.len().min(12)].to_string())
            .unwrap_or_else(|| String::from(UNKNOWN));

        let name = summary
            .names
            .as_ref()
            .and_then(|names| names.first())
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_else(|| String::from(UNKNOWN));

        let state = summary
            .state
            .clone()
            .unwrap_or_else(|| String::from(UNKNOWN));

        let image = summary
            .image
            .clone()
            .unwrap_or_else(|| String::from(UNKNOWN));

        let created = summary
            .created
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| String::from(UNKNOWN));

        let ports = match summary.ports.as_ref() {
            Some(ports) if !ports.is_empty() => {
                serde_json::to_string(ports).unwrap_or_else(|_| String::from(UNKNOWN))
            }
            _ => String::from("none"),
        };

        Self {
            id,
            name,
            state,
            image,
            created,
            ports,
        }
    }
}

/// Finds, creates, starts, stops and removes the single managed container.
pub struct ContainerManager {
    docker: Docker,
    config: ContainerConfig,
    /// Process-wide cached handle. Locked across the whole find-or-create
    /// path so resolution is serialized per manager instance.
    handle: Mutex<Option<ManagedContainer>>,
}

impl ContainerManager {
    /// Creates a manager for the given daemon client and configuration.
    #[must_use]
    pub fn new(docker: Docker, config: ContainerConfig) -> Self {
        Self {
            docker,
            config,
            handle: Mutex::new(None),
        }
    }

    /// Returns the container configuration.
    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Resolves the managed container, creating and starting it if needed.
    ///
    /// A cached handle is returned without contacting the daemon. Otherwise
    /// the daemon is consulted: a running container is reused as-is, a
    /// stopped one is started, an absent one is created, started, and given
    /// the settle delay before the handle is returned.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::Runtime` if any list/create/start call
    /// fails. Never retries.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<ManagedContainer, ContainerError> {
        let mut cached = self.handle.lock().await;

        if let Some(handle) = cached.as_ref() {
            debug!(id = %handle.short_id(), "Reusing cached container handle");
            return Ok(handle.clone());
        }

        let handle = self.find_or_create().await?;
        *cached = Some(handle.clone());
        Ok(handle)
    }

    async fn find_or_create(&self) -> Result<ManagedContainer, ContainerError> {
        if let Some(summary) = self.find_by_name().await? {
            let id = summary
                .id
                .clone()
                .unwrap_or_else(|| self.config.name.clone());

            if summary.state.as_deref() == Some("running") {
                info!(id = %id, "Container already running");
                return Ok(ManagedContainer::new(id));
            }

            self.docker
                .start_container(&id, None::<StartContainerOptions<String>>)
                .await
                .map_err(|e| ContainerError::runtime("start", &self.config.name, e))?;
            info!(id = %id, "Restarted stopped container");
            return Ok(ManagedContainer::new(id));
        }

        info!(image = %self.config.image, "Creating new container");

        let options = CreateContainerOptions {
            name: self.config.name.as_str(),
            platform: None,
        };

        let container_config = Config {
            image: Some(self.config.image.clone()),
            cmd: Some(vec![String::from("/bin/bash")]),
            tty: Some(true),
            open_stdin: Some(true),
            stdin_once: Some(false),
            working_dir: Some(self.config.working_dir.clone()),
            host_config: Some(HostConfig {
                privileged: Some(true),
                cap_add: Some(vec![String::from("ALL")]),
                security_opt: Some(vec![String::from("seccomp=unconfined")]),
                mounts: Some(vec![Mount {
                    typ: Some(MountTypeEnum::BIND),
                    source: Some(self.config.host_mount.clone()),
                    target: Some(self.config.container_mount.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(Some(options), container_config)
            .await
            .map_err(|e| ContainerError::runtime("create", &self.config.name, e))?;

        self.docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| ContainerError::runtime("start", &self.config.name, e))?;

        // Let the container's init shell become ready for exec calls.
        debug!(delay_ms = %self.config.settle_delay.as_millis(), "Waiting for container to settle");
        tokio::time::sleep(self.config.settle_delay).await;

        info!(id = %created.id, "New container started");
        Ok(ManagedContainer::new(created.id))
    }

    /// Stops and force-removes the managed container, clearing the cached
    /// handle. Returns [`StopOutcome::NotFound`] when nothing exists under
    /// the well-known name; that is a success, not an error.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::Runtime` if the daemon fails the list, stop
    /// or remove call.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<StopOutcome, ContainerError> {
        let mut cached = self.handle.lock().await;

        let Some(summary) = self.find_by_name().await? else {
            *cached = None;
            debug!("No container to stop");
            return Ok(StopOutcome::NotFound);
        };

        let id = summary
            .id
            .clone()
            .unwrap_or_else(|| self.config.name.clone());

        if summary.state.as_deref() == Some("running") {
            self.docker
                .stop_container(&id, None::<StopContainerOptions>)
                .await
                .map_err(|e| ContainerError::runtime("stop", &self.config.name, e))?;
        }

        self.docker
            .remove_container(
                &id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| ContainerError::runtime("remove", &self.config.name, e))?;

        *cached = None;
        info!(id = %id, "Container stopped and removed");
        Ok(StopOutcome::Removed)
    }

    /// Returns a status snapshot of the managed container, or `None` if it
    /// does not exist (a normal outcome, not an error).
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::Runtime` if the daemon list call fails.
    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<Option<ContainerStatus>, ContainerError> {
        Ok(self
            .find_by_name()
            .await?
            .as_ref()
            .map(ContainerStatus::from_summary))
    }

    /// Lists all containers (including stopped) and returns the one whose
    /// name matches the well-known name exactly.
    async fn find_by_name(&self) -> Result<Option<ContainerSummary>, ContainerError> {
        let mut filters = HashMap::new();
        filters.insert(String::from("name"), vec![self.config.name.clone()]);

        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters,
                ..Default::default()
            }))
            .await
            .map_err(|e| ContainerError::runtime("list", &self.config.name, e))?;

        // The daemon's name filter is a substring match; require the exact
        // well-known name.
        let needle = format!("/{}", self.config.name);
        Ok(containers
            .into_iter()
            .find(|c| {
                c.names
                    .as_ref()
                    .is_some_and(|names| names.iter().any(|n| n == &needle))
            }))
    }
}

impl std::fmt::Debug for ContainerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
