//! Container engine observations.

use super::labels::{self, Labels};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned container identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Wraps an engine-assigned identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Container state as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    /// Created but never started.
    Created,
    /// Running.
    Running,
    /// Paused.
    Paused,
    /// Restarting under the engine's own restart policy.
    Restarting,
    /// Exited.
    Exited,
    /// Dead.
    Dead,
    /// Any state the engine reports that is not listed above.
    Unknown,
}

impl ContainerState {
    /// Maps an engine state string. Unrecognised strings become
    /// [`ContainerState::Unknown`].
    #[must_use]
    pub fn from_engine(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }
}

/// Snapshot of a container returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    id: ContainerId,
    name: String,
    image: String,
    state: ContainerState,
    labels: Labels,
    created_at: DateTime<Utc>,
}

impl ContainerInfo {
    /// Creates a container snapshot.
    #[must_use]
    pub fn new(
        id: ContainerId,
        name: impl Into<String>,
        state: ContainerState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image: String::new(),
            state,
            labels: Labels::new(),
            created_at,
        }
    }

    /// Sets the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Replaces the observed state.
    #[must_use]
    pub const fn with_state(mut self, state: ContainerState) -> Self {
        self.state = state;
        self
    }

    /// Replaces the container labels.
    #[must_use]
    pub fn with_labels(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.labels = values.into_iter().collect();
        self
    }

    /// Returns the engine identifier.
    #[must_use]
    pub const fn id(&self) -> &ContainerId {
        &self.id
    }

    /// Returns the engine-reported container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the image reference.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Returns the engine-reported state.
    #[must_use]
    pub const fn state(&self) -> ContainerState {
        self.state
    }

    /// Returns the container labels.
    #[must_use]
    pub const fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the engine reports the container as running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }

    /// Returns whether the container is managed by this host.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        labels::is_managed(&self.labels)
    }

    /// Returns whether the container backs an auxiliary workload, which has
    /// no supervising proxy.
    #[must_use]
    pub fn is_auxiliary(&self) -> bool {
        labels::is_auxiliary(&self.labels)
    }

    /// Returns the user-facing workload name, falling back to the engine name.
    #[must_use]
    pub fn workload_name(&self) -> &str {
        labels::workload_name(&self.labels).unwrap_or(&self.name)
    }

    /// Returns the canonical base name, falling back to the engine name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        labels::base_name(&self.labels).unwrap_or(&self.name)
    }

    /// Returns whether `name` identifies this container, either as its
    /// workload name or as its engine identifier.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.workload_name() == name || self.id.as_str() == name
    }
}
