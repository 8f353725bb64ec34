//! Lifecycle reconciliation: bring one named workload back to running.

use super::RunStateLoader;
use crate::workload::{
    domain::{
        ContainerInfo, ReconcileAction, ReconcileObservation, WorkloadDomainError, WorkloadName,
    },
    ports::{
        ContainerEngine, ContainerEngineError, LaunchError, LaunchMode, ProxyProcessError,
        ProxyProcesses, RunStateError, RunStateStore, WorkloadLauncher,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while reconciling or stopping a workload.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The workload name failed validation.
    #[error(transparent)]
    Domain(#[from] WorkloadDomainError),
    /// Locating or inspecting the container failed.
    #[error(transparent)]
    Engine(#[from] ContainerEngineError),
    /// Stopping the container failed.
    #[error("failed to stop container for workload {name}: {source}")]
    Stop {
        /// Requested workload name.
        name: WorkloadName,
        /// Engine failure.
        source: ContainerEngineError,
    },
    /// Loading saved run state failed.
    #[error(transparent)]
    State(#[from] RunStateError),
    /// Launching the workload failed.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// No container answers to the name.
    #[error("workload {0} not found")]
    NotFound(WorkloadName),
    /// The container is not running.
    #[error("workload {0} is not running")]
    NotRunning(WorkloadName),
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

struct Observed {
    container: Option<ContainerInfo>,
    base_name: WorkloadName,
    running: bool,
}

/// Reconciles engine-observed state with the supervising proxy.
///
/// Each call runs strictly in sequence: locate, check liveness, decide, then
/// optionally stop and resume. Nothing is retried.
pub struct LifecycleReconciler<E, P, S, L>
where
    E: ContainerEngine + 'static,
    P: ProxyProcesses,
    S: RunStateStore,
    L: WorkloadLauncher,
{
    engine: Arc<E>,
    proxies: Arc<P>,
    loader: RunStateLoader<S>,
    launcher: Arc<L>,
}

impl<E, P, S, L> LifecycleReconciler<E, P, S, L>
where
    E: ContainerEngine + 'static,
    P: ProxyProcesses,
    S: RunStateStore,
    L: WorkloadLauncher,
{
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(
        engine: Arc<E>,
        proxies: Arc<P>,
        loader: RunStateLoader<S>,
        launcher: Arc<L>,
    ) -> Self {
        Self {
            engine,
            proxies,
            loader,
            launcher,
        }
    }

    /// Brings `name` back to a running state.
    ///
    /// A running container with a live proxy is left alone. A running
    /// container whose proxy is gone is stopped first. Either way a resume
    /// loads the saved state for the base name and launches it detached.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the name is invalid, the engine
    /// fails, the stop fails, no state was saved, or the launch fails.
    pub async fn reconcile(&self, name: &str) -> ReconcileResult<ReconcileAction> {
        let requested = WorkloadName::new(name)?;
        let observed = self.observe(&requested).await?;
        let proxy_running = self.proxies.is_running(&observed.base_name).await;

        let action = ReconcileAction::decide(ReconcileObservation {
            container_found: observed.container.is_some(),
            running: observed.running,
            proxy_running,
        });

        if !action.launches() {
            info!(workload = %requested, "workload already running");
            return Ok(action);
        }

        if action == ReconcileAction::StoppedAndResumed
            && let Some(container) = &observed.container
        {
            info!(
                workload = %requested,
                container = %container.id(),
                "proxy not running; stopping container before resume"
            );
            if !container.is_auxiliary() {
                self.release_proxy(&requested, &observed.base_name).await;
            }
            self.engine
                .stop(container.id())
                .await
                .map_err(|source| ReconcileError::Stop {
                    name: requested.clone(),
                    source,
                })?;
        }

        self.resume(&observed.base_name).await?;
        info!(workload = %requested, %action, "workload resumed");
        Ok(action)
    }

    /// Stops a running workload: its proxy first, then its container.
    ///
    /// Proxy termination is best effort and only logged on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::NotFound`] when no container answers to
    /// `name`, [`ReconcileError::NotRunning`] when it is already stopped,
    /// or engine errors.
    pub async fn stop(&self, name: &str) -> ReconcileResult<()> {
        let requested = WorkloadName::new(name)?;
        let container = self
            .engine
            .find_by_name(requested.as_str())
            .await?
            .ok_or_else(|| ReconcileError::NotFound(requested.clone()))?;

        if !self.engine.is_running(container.id()).await? {
            return Err(ReconcileError::NotRunning(requested));
        }

        let base_name = WorkloadName::new(container.base_name())?;
        self.release_proxy(&requested, &base_name).await;

        self.engine
            .stop(container.id())
            .await
            .map_err(|source| ReconcileError::Stop {
                name: requested.clone(),
                source,
            })?;
        info!(workload = %requested, "workload stopped");
        Ok(())
    }

    async fn release_proxy(&self, requested: &WorkloadName, base_name: &WorkloadName) {
        match self.proxies.terminate(base_name).await {
            Ok(()) => {}
            Err(ProxyProcessError::NoRecord(_)) => {
                debug!(workload = %requested, "no proxy process record to release");
            }
            Err(err) => {
                warn!(workload = %requested, error = %err, "failed to stop proxy process");
            }
        }
    }

    async fn observe(&self, requested: &WorkloadName) -> ReconcileResult<Observed> {
        let Some(container) = self.engine.find_by_name(requested.as_str()).await? else {
            warn!(
                workload = %requested,
                "container not found; resuming under the requested name"
            );
            return Ok(Observed {
                container: None,
                base_name: requested.clone(),
                running: false,
            });
        };

        let running = self.engine.is_running(container.id()).await?;
        let base_name = WorkloadName::new(container.base_name())?;
        Ok(Observed {
            container: Some(container),
            base_name,
            running,
        })
    }

    async fn resume(&self, base_name: &WorkloadName) -> ReconcileResult<()> {
        let engine: Arc<dyn ContainerEngine> = self.engine.clone();
        let config = self.loader.load(base_name, engine).await?;
        self.launcher.launch(&config, LaunchMode::Detached).await?;
        Ok(())
    }
}
