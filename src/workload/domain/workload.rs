//! Managed workload view.

use super::{
    ContainerInfo, ContainerState, TransportType, WorkloadStatus,
    labels::{self, Labels},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed workload as observed through the engine or state store.
///
/// The core reads workloads and requests transitions; it never mutates
/// their fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    name: String,
    status: WorkloadStatus,
    transport_type: Option<TransportType>,
    group: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    process_id: u32,
    package: String,
    port: Option<u16>,
    tool_type: Option<String>,
    labels: Labels,
    remote: bool,
}

impl Workload {
    /// Creates a workload with the given name and status.
    #[must_use]
    pub fn new(name: impl Into<String>, status: WorkloadStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            status,
            transport_type: None,
            group: None,
            created_at,
            started_at: None,
            process_id: 0,
            package: String::new(),
            port: None,
            tool_type: None,
            labels: Labels::new(),
            remote: false,
        }
    }

    /// Derives a workload from a managed container snapshot.
    #[must_use]
    pub fn from_container(container: &ContainerInfo) -> Self {
        let container_labels = container.labels();
        let status = match container.state() {
            ContainerState::Running => WorkloadStatus::Running,
            ContainerState::Restarting => WorkloadStatus::Starting,
            ContainerState::Created | ContainerState::Paused | ContainerState::Exited => {
                WorkloadStatus::Stopped
            }
            ContainerState::Dead => WorkloadStatus::Error,
            ContainerState::Unknown => WorkloadStatus::Unknown,
        };

        Self {
            name: container.workload_name().to_owned(),
            status,
            transport_type: labels::transport(container_labels)
                .and_then(|value| TransportType::try_from(value).ok()),
            group: labels::group(container_labels).map(str::to_owned),
            created_at: container.created_at(),
            started_at: None,
            process_id: 0,
            package: container.image().to_owned(),
            port: labels::port(container_labels),
            tool_type: labels::tool_type(container_labels).map(str::to_owned),
            labels: container_labels.clone(),
            remote: false,
        }
    }

    /// Sets the transport type.
    #[must_use]
    pub const fn with_transport_type(mut self, transport_type: TransportType) -> Self {
        self.transport_type = Some(transport_type);
        self
    }

    /// Sets the group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the start timestamp.
    #[must_use]
    pub const fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Sets the supervising process identifier.
    #[must_use]
    pub const fn with_process_id(mut self, process_id: u32) -> Self {
        self.process_id = process_id;
        self
    }

    /// Sets the package reference.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Replaces the labels.
    #[must_use]
    pub fn with_labels(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.labels = values.into_iter().collect();
        self
    }

    /// Marks the workload as remote.
    #[must_use]
    pub const fn as_remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// Returns the workload name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the canonical base name, falling back to the workload name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        labels::base_name(&self.labels).unwrap_or(&self.name)
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> WorkloadStatus {
        self.status
    }

    /// Returns the transport type, if known.
    #[must_use]
    pub const fn transport_type(&self) -> Option<TransportType> {
        self.transport_type
    }

    /// Returns the group, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the start timestamp, if known.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns the supervising process identifier, `0` if not process-backed.
    #[must_use]
    pub const fn process_id(&self) -> u32 {
        self.process_id
    }

    /// Returns the package reference.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Returns the proxy port, if known.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the tool type, if known.
    #[must_use]
    pub fn tool_type(&self) -> Option<&str> {
        self.tool_type.as_deref()
    }

    /// Returns the labels.
    #[must_use]
    pub const fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Returns whether the workload is remote.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }
}
