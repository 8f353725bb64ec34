//! Loads saved launch configuration and binds it to a live engine.

use crate::workload::{
    domain::WorkloadName,
    ports::{ContainerEngine, RunConfig, RunStateResult, RunStateStore},
};
use std::sync::Arc;
use tracing::debug;

/// Persisted run-state loader.
#[derive(Debug)]
pub struct RunStateLoader<S>
where
    S: RunStateStore,
{
    store: Arc<S>,
}

impl<S> Clone for RunStateLoader<S>
where
    S: RunStateStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> RunStateLoader<S>
where
    S: RunStateStore,
{
    /// Creates a loader over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Loads the state saved under `base_name` and binds it to `engine`.
    ///
    /// Remote workloads are bound to no engine.
    ///
    /// # Errors
    ///
    /// Returns [`crate::workload::ports::RunStateError::NotFound`] when no
    /// state was saved. Callers treat it as terminal for the workload.
    pub async fn load(
        &self,
        base_name: &WorkloadName,
        engine: Arc<dyn ContainerEngine>,
    ) -> RunStateResult<RunConfig> {
        let state = self.store.load(base_name).await?;
        let binding = (!state.is_remote()).then_some(engine);
        debug!(
            workload = %base_name,
            remote = state.is_remote(),
            "loaded saved run state"
        );
        Ok(RunConfig::new(state, binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{
        adapters::memory::{InMemoryContainerEngine, InMemoryRunStateStore},
        domain::{PersistedRunState, TransportConfig, TransportType},
        ports::RunStateError,
    };
    use rstest::{fixture, rstest};

    fn name(value: &str) -> WorkloadName {
        WorkloadName::new(value).expect("valid name")
    }

    #[fixture]
    fn engine() -> Arc<dyn ContainerEngine> {
        Arc::new(InMemoryContainerEngine::new())
    }

    async fn loader_with(states: &[PersistedRunState]) -> RunStateLoader<InMemoryRunStateStore> {
        let store = InMemoryRunStateStore::new();
        for state in states {
            store.save(state).await.expect("save");
        }
        RunStateLoader::new(Arc::new(store))
    }

    fn stdio_state(value: &str) -> PersistedRunState {
        PersistedRunState::new(
            name(value),
            "ghcr.io/example/fetch:1",
            TransportConfig::new(TransportType::Stdio),
        )
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn local_state_is_bound_to_engine(engine: Arc<dyn ContainerEngine>) {
        let loader = loader_with(&[stdio_state("fetch")]).await;

        let config = loader.load(&name("fetch"), engine).await.expect("load");

        assert!(config.engine().is_some());
        assert_eq!(config.base_name().as_str(), "fetch");
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn remote_state_has_no_engine(engine: Arc<dyn ContainerEngine>) {
        let remote = stdio_state("remote").with_remote_url("https://mcp.example.com/sse");
        let loader = loader_with(&[remote]).await;

        let config = loader.load(&name("remote"), engine).await.expect("load");

        assert!(config.engine().is_none());
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_state_is_not_found(engine: Arc<dyn ContainerEngine>) {
        let loader = loader_with(&[]).await;

        let result = loader.load(&name("ghost"), engine).await;

        assert!(matches!(result, Err(RunStateError::NotFound(found)) if found.as_str() == "ghost"));
    }
}
