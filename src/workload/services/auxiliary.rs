//! Launch of auxiliary workloads gated on HTTP readiness.

use super::{ReadinessPoller, RunStateLoader};
use crate::workload::{
    domain::{WorkloadDomainError, WorkloadName},
    ports::{
        ContainerEngine, LaunchError, LaunchMode, RunStateError, RunStateStore, WorkloadLauncher,
    },
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while launching an auxiliary workload.
#[derive(Debug, Error)]
pub enum AuxiliaryError {
    /// The workload name failed validation.
    #[error(transparent)]
    Domain(#[from] WorkloadDomainError),
    /// Loading saved run state failed.
    #[error(transparent)]
    State(#[from] RunStateError),
    /// Launching the workload failed.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// The workload did not become ready before the deadline.
    #[error("workload {name} was not ready at {url} within {deadline:?}")]
    NotReady {
        /// Workload base name.
        name: WorkloadName,
        /// Polled readiness endpoint.
        url: String,
        /// Deadline that elapsed.
        deadline: Duration,
    },
}

/// Result type for auxiliary launches.
pub type AuxiliaryResult<T> = Result<T, AuxiliaryError>;

/// Launches auxiliary workloads detached and waits for them to answer.
pub struct AuxiliaryLauncher<E, S, L>
where
    E: ContainerEngine + 'static,
    S: RunStateStore,
    L: WorkloadLauncher,
{
    engine: Arc<E>,
    loader: RunStateLoader<S>,
    launcher: Arc<L>,
    poller: ReadinessPoller,
}

impl<E, S, L> AuxiliaryLauncher<E, S, L>
where
    E: ContainerEngine + 'static,
    S: RunStateStore,
    L: WorkloadLauncher,
{
    /// Creates an auxiliary launcher.
    #[must_use]
    pub const fn new(
        engine: Arc<E>,
        loader: RunStateLoader<S>,
        launcher: Arc<L>,
        poller: ReadinessPoller,
    ) -> Self {
        Self {
            engine,
            loader,
            launcher,
            poller,
        }
    }

    /// Launches `name` from its saved state, then polls `readiness_url`
    /// until it answers or `deadline` passes.
    ///
    /// # Errors
    ///
    /// Returns [`AuxiliaryError::NotReady`] when the deadline passes first,
    /// and state or launch errors when the workload cannot be started.
    pub async fn launch(
        &self,
        name: &str,
        readiness_url: &str,
        deadline: Duration,
    ) -> AuxiliaryResult<()> {
        let base_name = WorkloadName::new(name)?;
        let engine: Arc<dyn ContainerEngine> = self.engine.clone();
        let config = self.loader.load(&base_name, engine).await?;
        self.launcher.launch(&config, LaunchMode::Detached).await?;
        info!(workload = %base_name, url = readiness_url, "waiting for auxiliary workload");

        if self
            .poller
            .wait_for_ready_within(readiness_url, deadline)
            .await
        {
            info!(workload = %base_name, "auxiliary workload ready");
            return Ok(());
        }

        warn!(workload = %base_name, url = readiness_url, "auxiliary workload not ready");
        Err(AuxiliaryError::NotReady {
            name: base_name,
            url: readiness_url.to_owned(),
            deadline,
        })
    }
}
