//! In-memory container engine for reconciliation tests.

use crate::workload::{
    domain::{ContainerId, ContainerInfo, ContainerState},
    ports::{ContainerEngine, ContainerEngineError, ContainerEngineResult},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

/// In-memory container engine.
///
/// Containers are kept in identifier order. Every `stop` call is recorded,
/// including rejected ones, so tests can assert exact call counts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContainerEngine {
    state: Arc<RwLock<InMemoryEngineState>>,
}

#[derive(Debug, Default)]
struct InMemoryEngineState {
    containers: BTreeMap<String, ContainerInfo>,
    stop_calls: Vec<ContainerId>,
    failing_stops: HashSet<ContainerId>,
}

fn lock_error(err: impl std::fmt::Display) -> ContainerEngineError {
    ContainerEngineError::runtime(std::io::Error::other(err.to_string()))
}

impl InMemoryContainerEngine {
    /// Creates an engine with no containers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a container.
    ///
    /// # Errors
    ///
    /// Returns engine runtime errors when lock acquisition fails.
    pub fn insert(&self, container: ContainerInfo) -> ContainerEngineResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .containers
            .insert(container.id().as_str().to_owned(), container);
        Ok(())
    }

    /// Makes every subsequent `stop` of `id` fail.
    ///
    /// # Errors
    ///
    /// Returns engine runtime errors when lock acquisition fails.
    pub fn fail_stops_for(&self, id: ContainerId) -> ContainerEngineResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failing_stops.insert(id);
        Ok(())
    }

    /// Returns the identifiers passed to `stop`, in call order.
    ///
    /// # Errors
    ///
    /// Returns engine runtime errors when lock acquisition fails.
    pub fn stop_calls(&self) -> ContainerEngineResult<Vec<ContainerId>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.stop_calls.clone())
    }
}

#[async_trait]
impl ContainerEngine for InMemoryContainerEngine {
    async fn find_by_name(&self, name: &str) -> ContainerEngineResult<Option<ContainerInfo>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .containers
            .values()
            .find(|container| container.answers_to(name))
            .cloned())
    }

    async fn is_running(&self, id: &ContainerId) -> ContainerEngineResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        state
            .containers
            .get(id.as_str())
            .map(ContainerInfo::is_running)
            .ok_or_else(|| ContainerEngineError::NotFound(id.clone()))
    }

    async fn stop(&self, id: &ContainerId) -> ContainerEngineResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.stop_calls.push(id.clone());

        if state.failing_stops.contains(id) {
            return Err(ContainerEngineError::runtime(std::io::Error::other(
                format!("stop of container {id} rejected"),
            )));
        }

        let stopped = state
            .containers
            .remove(id.as_str())
            .ok_or_else(|| ContainerEngineError::NotFound(id.clone()))?
            .with_state(ContainerState::Exited);
        state.containers.insert(id.as_str().to_owned(), stopped);
        Ok(())
    }

    async fn list(&self, include_stopped: bool) -> ContainerEngineResult<Vec<ContainerInfo>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .containers
            .values()
            .filter(|container| include_stopped || container.is_running())
            .cloned()
            .collect())
    }
}
