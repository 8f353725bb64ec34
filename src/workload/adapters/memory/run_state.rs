//! In-memory run-state store.

use crate::workload::{
    domain::{PersistedRunState, WorkloadName},
    ports::{RunStateError, RunStateResult, RunStateStore},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory [`RunStateStore`] that remembers which base names
/// were loaded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunStateStore {
    state: Arc<RwLock<InMemoryRunStates>>,
}

#[derive(Debug, Default)]
struct InMemoryRunStates {
    saved: HashMap<WorkloadName, PersistedRunState>,
    loaded: Vec<WorkloadName>,
}

fn lock_error(err: impl std::fmt::Display) -> RunStateError {
    RunStateError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryRunStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every base name passed to `load`, in call order.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn loaded_names(&self) -> RunStateResult<Vec<WorkloadName>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.loaded.clone())
    }
}

#[async_trait]
impl RunStateStore for InMemoryRunStateStore {
    async fn load(&self, base_name: &WorkloadName) -> RunStateResult<PersistedRunState> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.loaded.push(base_name.clone());
        state
            .saved
            .get(base_name)
            .cloned()
            .ok_or_else(|| RunStateError::NotFound(base_name.clone()))
    }

    async fn save(&self, run_state: &PersistedRunState) -> RunStateResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .saved
            .insert(run_state.base_name().clone(), run_state.clone());
        Ok(())
    }

    async fn delete(&self, base_name: &WorkloadName) -> RunStateResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.saved.remove(base_name);
        Ok(())
    }

    async fn list(&self) -> RunStateResult<Vec<WorkloadName>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut names: Vec<WorkloadName> = state.saved.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
