//! Persistence port for saved launch configuration.

use crate::workload::domain::{PersistedRunState, WorkloadName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for run-state persistence.
pub type RunStateResult<T> = Result<T, RunStateError>;

/// Storage contract for [`PersistedRunState`] keyed by base name.
#[async_trait]
pub trait RunStateStore: Send + Sync {
    /// Loads the saved state for a base name.
    ///
    /// # Errors
    ///
    /// Returns [`RunStateError::NotFound`] when nothing was saved and
    /// [`RunStateError::InvalidState`] when the saved data cannot be decoded.
    async fn load(&self, base_name: &WorkloadName) -> RunStateResult<PersistedRunState>;

    /// Saves state, replacing any previous value for its base name.
    async fn save(&self, state: &PersistedRunState) -> RunStateResult<()>;

    /// Deletes saved state. Deleting absent state succeeds.
    async fn delete(&self, base_name: &WorkloadName) -> RunStateResult<()>;

    /// Lists the base names with saved state, in name order.
    ///
    /// # Errors
    ///
    /// Returns [`RunStateError::Persistence`] when the store cannot be read.
    async fn list(&self) -> RunStateResult<Vec<WorkloadName>>;
}

/// Errors returned by run-state stores.
#[derive(Debug, Clone, Error)]
pub enum RunStateError {
    /// No state was saved for the base name.
    #[error("no saved run state for workload {0}")]
    NotFound(WorkloadName),

    /// Saved state could not be decoded.
    #[error("invalid saved run state for workload {name}: {source}")]
    InvalidState {
        /// Base name whose state is corrupt.
        name: WorkloadName,
        /// Decoding failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Storage failure.
    #[error("run state persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RunStateError {
    /// Wraps a decoding failure for `name`.
    pub fn invalid_state(
        name: WorkloadName,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidState {
            name,
            source: Arc::new(err),
        }
    }

    /// Wraps a storage failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
