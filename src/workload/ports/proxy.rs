//! Port for supervising proxy processes tracked through PID records.

use crate::workload::domain::{ProxyProcessRecord, WorkloadName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for proxy process operations.
pub type ProxyProcessResult<T> = Result<T, ProxyProcessError>;

/// Tracks the out-of-process supervisor of each workload.
#[async_trait]
pub trait ProxyProcesses: Send + Sync {
    /// Reports whether the supervisor for `base_name` is alive.
    ///
    /// Missing, unreadable or stale records all report `false`.
    async fn is_running(&self, base_name: &WorkloadName) -> bool;

    /// Writes the PID record for a freshly launched supervisor.
    async fn record(
        &self,
        base_name: &WorkloadName,
        record: ProxyProcessRecord,
    ) -> ProxyProcessResult<()>;

    /// Signals the recorded supervisor to exit and removes its record.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyProcessError::NoRecord`] when no record exists.
    async fn terminate(&self, base_name: &WorkloadName) -> ProxyProcessResult<()>;
}

/// Errors returned by proxy process trackers.
#[derive(Debug, Clone, Error)]
pub enum ProxyProcessError {
    /// No PID record exists for the workload.
    #[error("no proxy process recorded for workload {0}")]
    NoRecord(WorkloadName),

    /// Signalling the process failed.
    #[error("failed to signal proxy process {pid} of workload {name}: {source}")]
    Signal {
        /// Base name of the workload.
        name: WorkloadName,
        /// Recorded process identifier.
        pid: u32,
        /// Underlying failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Reading or writing the PID record failed.
    #[error("proxy process record error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProxyProcessError {
    /// Wraps a PID record storage failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
