//! Concurrent restart of many workloads with per-workload failure isolation.

use super::LifecycleReconciler;
use crate::workload::{
    domain::{RestartOutcome, RestartSummary, WorkloadName},
    ports::{
        ContainerEngine, ProxyProcesses, RestartError, RestartHandle, RestartInitiator,
        RunStateStore, WorkloadCatalog, WorkloadCatalogError, WorkloadLauncher,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Errors returned by bulk restarts.
#[derive(Debug, Error)]
pub enum BulkRestartError {
    /// Listing workloads failed, so nothing was restarted.
    #[error(transparent)]
    Catalog(#[from] WorkloadCatalogError),
    /// At least one workload failed to restart.
    #[error("failed to restart {} of {} workloads", .summary.failed(), .summary.failed() + .summary.restarted())]
    Failed {
        /// Full summary, including the successes.
        summary: RestartSummary,
    },
}

/// Result type for bulk restarts.
pub type BulkRestartResult<T> = Result<T, BulkRestartError>;

/// Fans restarts out across workloads and aggregates their outcomes.
pub struct BulkRestartOrchestrator<C, I>
where
    C: WorkloadCatalog,
    I: RestartInitiator,
{
    catalog: Arc<C>,
    initiator: Arc<I>,
}

impl<C, I> BulkRestartOrchestrator<C, I>
where
    C: WorkloadCatalog,
    I: RestartInitiator,
{
    /// Creates an orchestrator.
    #[must_use]
    pub const fn new(catalog: Arc<C>, initiator: Arc<I>) -> Self {
        Self { catalog, initiator }
    }

    /// Restarts every managed workload, stopped ones included.
    ///
    /// An empty catalog succeeds with a summary for which
    /// [`RestartSummary::is_nothing_to_do`] holds.
    ///
    /// # Errors
    ///
    /// Returns [`BulkRestartError::Catalog`] when listing fails and
    /// [`BulkRestartError::Failed`] when any workload failed.
    pub async fn restart_all(&self) -> BulkRestartResult<RestartSummary> {
        let workloads = self.catalog.list_workloads(true).await?;
        let names: Vec<String> = workloads
            .iter()
            .map(|workload| workload.name().to_owned())
            .collect();
        self.restart(&names).await
    }

    /// Restarts an explicit list of workloads.
    ///
    /// Every restart is initiated before any is awaited. An initiation
    /// failure is recorded immediately and never delays the others.
    ///
    /// # Errors
    ///
    /// Returns [`BulkRestartError::Failed`] when any workload failed.
    pub async fn restart<N>(&self, names: &[N]) -> BulkRestartResult<RestartSummary>
    where
        N: AsRef<str> + Sync,
    {
        if names.is_empty() {
            info!("no workloads to restart");
            return Ok(RestartSummary::default());
        }

        let mut outcomes = Vec::with_capacity(names.len());
        let mut handles = Vec::with_capacity(names.len());
        for name in names {
            match self.initiator.initiate(name.as_ref()) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    warn!(workload = name.as_ref(), error = %err, "failed to initiate restart");
                    outcomes.push(RestartOutcome::failed(name.as_ref(), err));
                }
            }
        }

        for handle in handles {
            debug!(workload = handle.name(), "awaiting restart");
            let outcome = handle.wait().await;
            match outcome.error() {
                None => info!(workload = outcome.name(), "workload restarted"),
                Some(error) => warn!(workload = outcome.name(), error, "workload restart failed"),
            }
            outcomes.push(outcome);
        }

        let summary = RestartSummary::from_outcomes(outcomes);
        info!(
            restarted = summary.restarted(),
            failed = summary.failed(),
            "bulk restart finished"
        );
        if summary.is_success() {
            Ok(summary)
        } else {
            Err(BulkRestartError::Failed { summary })
        }
    }
}

/// [`RestartInitiator`] that spawns one reconciliation task per workload on
/// the current tokio runtime.
pub struct ReconcilingInitiator<E, P, S, L>
where
    E: ContainerEngine + 'static,
    P: ProxyProcesses + 'static,
    S: RunStateStore + 'static,
    L: WorkloadLauncher + 'static,
{
    reconciler: Arc<LifecycleReconciler<E, P, S, L>>,
}

impl<E, P, S, L> ReconcilingInitiator<E, P, S, L>
where
    E: ContainerEngine + 'static,
    P: ProxyProcesses + 'static,
    S: RunStateStore + 'static,
    L: WorkloadLauncher + 'static,
{
    /// Creates an initiator sharing `reconciler` across tasks.
    #[must_use]
    pub const fn new(reconciler: Arc<LifecycleReconciler<E, P, S, L>>) -> Self {
        Self { reconciler }
    }
}

impl<E, P, S, L> RestartInitiator for ReconcilingInitiator<E, P, S, L>
where
    E: ContainerEngine + 'static,
    P: ProxyProcesses + 'static,
    S: RunStateStore + 'static,
    L: WorkloadLauncher + 'static,
{
    fn initiate(&self, name: &str) -> Result<RestartHandle, RestartError> {
        let workload = WorkloadName::new(name)?;
        let runtime = Handle::try_current().map_err(|_| RestartError::NoRuntime)?;
        let reconciler = Arc::clone(&self.reconciler);
        let task = runtime.spawn(async move {
            reconciler
                .reconcile(workload.as_str())
                .await
                .map_err(RestartError::failed)
        });
        Ok(RestartHandle::new(name.to_owned(), task))
    }
}
