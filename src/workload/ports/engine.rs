//! Container engine port consumed by reconciliation and discovery.

use crate::workload::domain::{ContainerId, ContainerInfo};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for container engine operations.
pub type ContainerEngineResult<T> = Result<T, ContainerEngineError>;

/// Minimal container engine contract.
///
/// Implementations must be shareable across concurrently running
/// reconciliations.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Finds a container whose workload-name label or engine identifier
    /// matches `name`.
    async fn find_by_name(&self, name: &str) -> ContainerEngineResult<Option<ContainerInfo>>;

    /// Reports whether the container is running.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerEngineError::NotFound`] when the engine does not
    /// know the container.
    async fn is_running(&self, id: &ContainerId) -> ContainerEngineResult<bool>;

    /// Stops the container.
    async fn stop(&self, id: &ContainerId) -> ContainerEngineResult<()>;

    /// Lists containers, optionally including stopped ones.
    async fn list(&self, include_stopped: bool) -> ContainerEngineResult<Vec<ContainerInfo>>;
}

/// Errors returned by container engine adapters.
#[derive(Debug, Clone, Error)]
pub enum ContainerEngineError {
    /// The engine has no container with the given identifier.
    #[error("container {0} not found")]
    NotFound(ContainerId),

    /// Engine-side failure.
    #[error("container engine error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ContainerEngineError {
    /// Wraps an engine failure.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
