//! In-memory proxy process tracker.

use crate::workload::{
    domain::{ProxyProcessRecord, WorkloadName},
    ports::{ProxyProcessError, ProxyProcessResult, ProxyProcesses},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// In-memory [`ProxyProcesses`] implementation.
///
/// Liveness is simulated: recording a process marks it alive, and
/// [`InMemoryProxyProcesses::set_running`] overrides it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProxyProcesses {
    state: Arc<RwLock<InMemoryProxyState>>,
}

#[derive(Debug, Default)]
struct InMemoryProxyState {
    records: HashMap<WorkloadName, ProxyProcessRecord>,
    alive: HashSet<WorkloadName>,
    terminated: Vec<WorkloadName>,
}

fn lock_error(err: impl std::fmt::Display) -> ProxyProcessError {
    ProxyProcessError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryProxyProcesses {
    /// Creates a tracker with no records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the simulated liveness of a workload's proxy.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn set_running(&self, base_name: &WorkloadName, running: bool) -> ProxyProcessResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if running {
            state.alive.insert(base_name.clone());
        } else {
            state.alive.remove(base_name);
        }
        Ok(())
    }

    /// Returns the stored record for a workload.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn record_for(
        &self,
        base_name: &WorkloadName,
    ) -> ProxyProcessResult<Option<ProxyProcessRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.records.get(base_name).copied())
    }

    /// Returns every base name passed to `terminate` that had a record.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn terminated(&self) -> ProxyProcessResult<Vec<WorkloadName>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.terminated.clone())
    }
}

#[async_trait]
impl ProxyProcesses for InMemoryProxyProcesses {
    async fn is_running(&self, base_name: &WorkloadName) -> bool {
        self.state
            .read()
            .is_ok_and(|state| state.alive.contains(base_name))
    }

    async fn record(
        &self,
        base_name: &WorkloadName,
        record: ProxyProcessRecord,
    ) -> ProxyProcessResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.records.insert(base_name.clone(), record);
        state.alive.insert(base_name.clone());
        Ok(())
    }

    async fn terminate(&self, base_name: &WorkloadName) -> ProxyProcessResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.alive.remove(base_name);
        if state.records.remove(base_name).is_none() {
            return Err(ProxyProcessError::NoRecord(base_name.clone()));
        }
        state.terminated.push(base_name.clone());
        Ok(())
    }
}
