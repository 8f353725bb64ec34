//! Launcher that records launches instead of spawning processes.

use crate::workload::{
    domain::{ProxyProcessRecord, WorkloadName},
    ports::{LaunchError, LaunchMode, LaunchResult, ProxyProcesses, RunConfig, WorkloadLauncher},
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::InMemoryProxyProcesses;

/// One recorded launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLaunch {
    /// Base name of the launched workload.
    pub base_name: WorkloadName,
    /// Requested launch mode.
    pub mode: LaunchMode,
    /// Whether the configuration carried an engine handle.
    pub engine_bound: bool,
}

/// [`WorkloadLauncher`] that records every launch.
///
/// When built with [`RecordingLauncher::with_proxies`], a successful launch
/// records a proxy process so the workload then reports as alive.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    state: Arc<RwLock<RecordingState>>,
    proxies: Option<Arc<InMemoryProxyProcesses>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct RecordingState {
    launches: Vec<RecordedLaunch>,
    failing: HashSet<WorkloadName>,
    next_pid: u32,
}

fn lock_error(err: impl std::fmt::Display) -> LaunchError {
    LaunchError::runtime(std::io::Error::other(err.to_string()))
}

impl RecordingLauncher {
    /// Creates a launcher that only records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a proxy process in `proxies` for each successful launch.
    #[must_use]
    pub fn with_proxies(mut self, proxies: Arc<InMemoryProxyProcesses>) -> Self {
        self.proxies = Some(proxies);
        self
    }

    /// Delays each launch.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes launches of `base_name` fail.
    ///
    /// # Errors
    ///
    /// Returns launch errors when lock acquisition fails.
    pub fn fail_for(&self, base_name: WorkloadName) -> LaunchResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failing.insert(base_name);
        Ok(())
    }

    /// Returns recorded launches in call order.
    ///
    /// # Errors
    ///
    /// Returns launch errors when lock acquisition fails.
    pub fn launches(&self) -> LaunchResult<Vec<RecordedLaunch>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.launches.clone())
    }
}

#[async_trait]
impl WorkloadLauncher for RecordingLauncher {
    async fn launch(&self, config: &RunConfig, mode: LaunchMode) -> LaunchResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let pid = {
            let mut state = self.state.write().map_err(lock_error)?;
            state.launches.push(RecordedLaunch {
                base_name: config.base_name().clone(),
                mode,
                engine_bound: config.engine().is_some(),
            });
            if state.failing.contains(config.base_name()) {
                return Err(LaunchError::runtime(std::io::Error::other(format!(
                    "launch of {} rejected",
                    config.base_name()
                ))));
            }
            state.next_pid = state.next_pid.saturating_add(1);
            state.next_pid
        };

        if let Some(proxies) = &self.proxies {
            proxies
                .record(config.base_name(), ProxyProcessRecord::new(pid))
                .await?;
        }
        Ok(())
    }
}
