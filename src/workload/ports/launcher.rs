//! Launch port and the loaded configuration it consumes.

use super::{ContainerEngine, ProxyProcessError};
use crate::workload::domain::{PersistedRunState, WorkloadName};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for launch operations.
pub type LaunchResult<T> = Result<T, LaunchError>;

/// How a workload is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchMode {
    /// Start the supervisor in the background and return once it is spawned.
    Detached,
    /// Run the supervisor in the caller's process group until it exits.
    Foreground,
}

/// Saved launch configuration bound to a live engine handle.
///
/// Remote workloads carry no engine handle.
#[derive(Clone)]
pub struct RunConfig {
    state: PersistedRunState,
    engine: Option<Arc<dyn ContainerEngine>>,
}

impl RunConfig {
    /// Binds saved state to an engine handle.
    #[must_use]
    pub fn new(state: PersistedRunState, engine: Option<Arc<dyn ContainerEngine>>) -> Self {
        Self { state, engine }
    }

    /// Returns the saved state.
    #[must_use]
    pub const fn state(&self) -> &PersistedRunState {
        &self.state
    }

    /// Returns the workload base name.
    #[must_use]
    pub const fn base_name(&self) -> &WorkloadName {
        self.state.base_name()
    }

    /// Returns the bound engine handle, if any.
    #[must_use]
    pub fn engine(&self) -> Option<&Arc<dyn ContainerEngine>> {
        self.engine.as_ref()
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RunConfig")
            .field("state", &self.state)
            .field("engine_bound", &self.engine.is_some())
            .finish()
    }
}

/// Starts a workload from its loaded configuration.
#[async_trait]
pub trait WorkloadLauncher: Send + Sync {
    /// Launches the workload.
    async fn launch(&self, config: &RunConfig, mode: LaunchMode) -> LaunchResult<()>;
}

/// Errors returned by workload launchers.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// A foreground supervisor exited unsuccessfully.
    #[error("supervisor for workload {name} exited with status {code:?}")]
    Exited {
        /// Workload base name.
        name: WorkloadName,
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
    },

    /// Recording the launched supervisor failed.
    #[error(transparent)]
    Record(#[from] ProxyProcessError),

    /// Spawning or preparing the supervisor failed.
    #[error("failed to launch workload: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl LaunchError {
    /// Wraps a launch failure.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
