//! Workload status domain types.

use super::ParseWorkloadStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed status of a managed workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStatus {
    /// Status could not be determined.
    Unknown,
    /// Workload is being started.
    Starting,
    /// Workload is running.
    Running,
    /// Workload is running but failing health checks.
    Unhealthy,
    /// Workload failed.
    Error,
    /// Workload is being stopped.
    Stopping,
    /// Workload is stopped.
    Stopped,
    /// Workload is being removed.
    Removing,
    /// Workload is running but its upstream credentials are missing or expired.
    Unauthenticated,
}

impl WorkloadStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Unhealthy => "unhealthy",
            Self::Error => "error",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Removing => "removing",
            Self::Unauthenticated => "unauthenticated",
        }
    }

    /// Returns whether the status counts as running for listing purposes.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::Unhealthy | Self::Unauthenticated)
    }
}

impl fmt::Display for WorkloadStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkloadStatus {
    type Error = ParseWorkloadStatusError;

    fn try_from(value: &str) -> Result<Self, ParseWorkloadStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unknown" => Ok(Self::Unknown),
            "starting" => Ok(Self::Starting),
            "running" => Ok(Self::Running),
            "unhealthy" => Ok(Self::Unhealthy),
            "error" => Ok(Self::Error),
            "stopping" => Ok(Self::Stopping),
            "stopped" => Ok(Self::Stopped),
            "removing" => Ok(Self::Removing),
            "unauthenticated" => Ok(Self::Unauthenticated),
            _ => Err(ParseWorkloadStatusError(value.to_owned())),
        }
    }
}
