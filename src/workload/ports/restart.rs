//! Per-workload restart primitive used by bulk restarts.

use crate::workload::domain::{ReconcileAction, RestartOutcome, WorkloadDomainError};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Result produced by a restart task.
pub type RestartTaskResult = Result<ReconcileAction, RestartError>;

/// Starts one workload restart without waiting for it.
pub trait RestartInitiator: Send + Sync {
    /// Initiates a restart and returns a handle tagged with the workload
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`RestartError`] when the restart could not be started. No
    /// task exists in that case.
    fn initiate(&self, name: &str) -> Result<RestartHandle, RestartError>;
}

/// In-flight restart of a named workload.
#[derive(Debug)]
pub struct RestartHandle {
    name: String,
    task: JoinHandle<RestartTaskResult>,
}

impl RestartHandle {
    /// Tags a spawned restart task with its workload name.
    #[must_use]
    pub const fn new(name: String, task: JoinHandle<RestartTaskResult>) -> Self {
        Self { name, task }
    }

    /// Returns the workload name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the task and attributes its result to the workload.
    pub async fn wait(self) -> RestartOutcome {
        match self.task.await {
            Ok(Ok(_)) => RestartOutcome::succeeded(self.name),
            Ok(Err(err)) => RestartOutcome::failed(self.name, err),
            Err(join_error) => {
                RestartOutcome::failed(self.name, RestartError::Aborted(join_error.to_string()))
            }
        }
    }
}

/// Errors raised while starting or running a restart.
#[derive(Debug, Clone, Error)]
pub enum RestartError {
    /// The workload name failed validation.
    #[error(transparent)]
    InvalidName(#[from] WorkloadDomainError),

    /// No async runtime was available to run the restart.
    #[error("no async runtime available to run the restart")]
    NoRuntime,

    /// The restart task panicked or was cancelled.
    #[error("restart task aborted: {0}")]
    Aborted(String),

    /// The restart ran and failed.
    #[error("{0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl RestartError {
    /// Wraps a failure raised by the restart itself.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }
}
