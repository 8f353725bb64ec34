//! Workload discovery port.

use super::{ContainerEngineError, RunStateError};
use crate::workload::domain::Workload;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for workload catalog operations.
pub type WorkloadCatalogResult<T> = Result<T, WorkloadCatalogError>;

/// Read-only view of the workloads managed on this host.
#[async_trait]
pub trait WorkloadCatalog: Send + Sync {
    /// Lists managed workloads, optionally including stopped ones.
    async fn list_workloads(&self, include_stopped: bool) -> WorkloadCatalogResult<Vec<Workload>>;

    /// Returns a single managed workload.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadCatalogError::NotFound`] when no managed workload
    /// answers to `name`.
    async fn get_workload(&self, name: &str) -> WorkloadCatalogResult<Workload>;
}

/// Errors returned by workload catalog implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkloadCatalogError {
    /// No managed workload answers to the name.
    #[error("workload {0} not found")]
    NotFound(String),

    /// The backing engine failed.
    #[error(transparent)]
    Engine(#[from] ContainerEngineError),

    /// The run-state store failed.
    #[error(transparent)]
    State(#[from] RunStateError),
}
