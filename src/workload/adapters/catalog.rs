//! Workload catalogs derived from the container engine and saved state.

use crate::workload::{
    domain::{PersistedRunState, Workload, WorkloadName, WorkloadStatus},
    ports::{
        ContainerEngine, ProxyProcesses, RunStateError, RunStateStore, WorkloadCatalog,
        WorkloadCatalogError, WorkloadCatalogResult,
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

/// [`WorkloadCatalog`] over managed containers reported by an engine.
///
/// Containers without the managed label are invisible.
#[derive(Debug, Clone)]
pub struct EngineWorkloadCatalog<E>
where
    E: ContainerEngine,
{
    engine: Arc<E>,
}

impl<E> EngineWorkloadCatalog<E>
where
    E: ContainerEngine,
{
    /// Creates a catalog over `engine`.
    #[must_use]
    pub const fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<E> WorkloadCatalog for EngineWorkloadCatalog<E>
where
    E: ContainerEngine,
{
    async fn list_workloads(&self, include_stopped: bool) -> WorkloadCatalogResult<Vec<Workload>> {
        let containers = self.engine.list(include_stopped).await?;
        Ok(containers
            .iter()
            .filter(|container| container.is_managed())
            .map(Workload::from_container)
            .collect())
    }

    async fn get_workload(&self, name: &str) -> WorkloadCatalogResult<Workload> {
        self.engine
            .find_by_name(name)
            .await?
            .filter(|container| container.is_managed())
            .map(|container| Workload::from_container(&container))
            .ok_or_else(|| WorkloadCatalogError::NotFound(name.to_owned()))
    }
}

/// [`WorkloadCatalog`] over every workload this host knows about.
///
/// Managed containers come from the engine. Remote workloads have no
/// container; they are read from saved state with a remote URL and are
/// running while their proxy is alive. A remote state whose name is already
/// taken by a container is ignored. Failing to read remote state only logs
/// a warning and the container workloads are still listed.
pub struct HostWorkloadCatalog<E, S, P, C>
where
    E: ContainerEngine,
    S: RunStateStore,
    P: ProxyProcesses,
    C: Clock + Send + Sync,
{
    containers: EngineWorkloadCatalog<E>,
    states: Arc<S>,
    proxies: Arc<P>,
    clock: Arc<C>,
}

impl<E, S, P, C> HostWorkloadCatalog<E, S, P, C>
where
    E: ContainerEngine,
    S: RunStateStore,
    P: ProxyProcesses,
    C: Clock + Send + Sync,
{
    /// Creates a catalog over `engine` and the saved states in `states`.
    #[must_use]
    pub const fn new(engine: Arc<E>, states: Arc<S>, proxies: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            containers: EngineWorkloadCatalog::new(engine),
            states,
            proxies,
            clock,
        }
    }

    async fn remote_workloads(&self, include_stopped: bool) -> WorkloadCatalogResult<Vec<Workload>> {
        let mut workloads = Vec::new();
        for base_name in self.states.list().await? {
            let state = match self.states.load(&base_name).await {
                Ok(state) => state,
                Err(err) => {
                    warn!(workload = %base_name, error = %err, "skipping unreadable run state");
                    continue;
                }
            };
            if let Some(workload) = self.remote_workload(&state).await
                && (include_stopped || workload.status().is_running())
            {
                workloads.push(workload);
            }
        }
        Ok(workloads)
    }

    async fn remote_workload(&self, state: &PersistedRunState) -> Option<Workload> {
        let url = state.remote_url()?;
        let status = if self.proxies.is_running(state.base_name()).await {
            WorkloadStatus::Running
        } else {
            WorkloadStatus::Stopped
        };

        let mut workload = Workload::new(state.base_name().as_str(), status, self.clock.utc())
            .with_package(url)
            .with_transport_type(state.transport_type())
            .as_remote();
        if let Some(group) = state.group() {
            workload = workload.with_group(group);
        }
        Some(workload)
    }

    async fn get_remote(&self, name: &str) -> WorkloadCatalogResult<Workload> {
        let not_found = || WorkloadCatalogError::NotFound(name.to_owned());
        let base_name = WorkloadName::new(name).map_err(|_| not_found())?;
        let state = match self.states.load(&base_name).await {
            Ok(state) => state,
            Err(RunStateError::NotFound(_)) => return Err(not_found()),
            Err(err) => return Err(err.into()),
        };
        self.remote_workload(&state).await.ok_or_else(not_found)
    }
}

#[async_trait]
impl<E, S, P, C> WorkloadCatalog for HostWorkloadCatalog<E, S, P, C>
where
    E: ContainerEngine,
    S: RunStateStore,
    P: ProxyProcesses,
    C: Clock + Send + Sync,
{
    async fn list_workloads(&self, include_stopped: bool) -> WorkloadCatalogResult<Vec<Workload>> {
        let mut workloads = self.containers.list_workloads(include_stopped).await?;
        let remote = match self.remote_workloads(include_stopped).await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(error = %err, "failed to list remote workloads");
                return Ok(workloads);
            }
        };

        let taken: BTreeSet<String> = workloads
            .iter()
            .map(|workload| workload.base_name().to_owned())
            .collect();
        workloads.extend(
            remote
                .into_iter()
                .filter(|workload| !taken.contains(workload.base_name())),
        );
        Ok(workloads)
    }

    async fn get_workload(&self, name: &str) -> WorkloadCatalogResult<Workload> {
        match self.containers.get_workload(name).await {
            Err(WorkloadCatalogError::NotFound(_)) => self.get_remote(name).await,
            found => found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{
        adapters::memory::{InMemoryContainerEngine, InMemoryProxyProcesses, InMemoryRunStateStore},
        domain::{
            ContainerId, ContainerInfo, ContainerState, TransportConfig, TransportType, labels,
        },
    };
    use chrono::Utc;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn container(id: &str, name: &str, state: ContainerState, managed: bool) -> ContainerInfo {
        let mut values = vec![(labels::LABEL_NAME.to_owned(), name.to_owned())];
        if managed {
            values.push((labels::LABEL_MANAGED.to_owned(), "true".to_owned()));
        }
        ContainerInfo::new(ContainerId::new(id), name, state, Utc::now()).with_labels(values)
    }

    fn catalog() -> EngineWorkloadCatalog<InMemoryContainerEngine> {
        let engine = InMemoryContainerEngine::new();
        for info in [
            container("c1", "alpha", ContainerState::Running, true),
            container("c2", "beta", ContainerState::Exited, true),
            container("c3", "stranger", ContainerState::Running, false),
        ] {
            engine.insert(info).expect("insert");
        }
        EngineWorkloadCatalog::new(Arc::new(engine))
    }

    #[rstest]
    #[case(false, &["alpha"])]
    #[case(true, &["alpha", "beta"])]
    #[tokio::test(flavor = "multi_thread")]
    async fn lists_only_managed_workloads(#[case] include_stopped: bool, #[case] expected: &[&str]) {
        let workloads = catalog()
            .list_workloads(include_stopped)
            .await
            .expect("list");
        let names: Vec<&str> = workloads.iter().map(Workload::name).collect();
        assert_eq!(names, expected);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn get_workload_maps_container_state() {
        let workload = catalog().get_workload("beta").await.expect("beta");
        assert_eq!(workload.status(), WorkloadStatus::Stopped);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn unmanaged_container_is_not_found() {
        let result = catalog().get_workload("stranger").await;
        assert!(matches!(result, Err(WorkloadCatalogError::NotFound(name)) if name == "stranger"));
    }

    struct HostFixture {
        states: Arc<InMemoryRunStateStore>,
        catalog: HostWorkloadCatalog<
            InMemoryContainerEngine,
            InMemoryRunStateStore,
            InMemoryProxyProcesses,
            DefaultClock,
        >,
    }

    fn saved(base: &str, remote_url: Option<&str>) -> PersistedRunState {
        let state = PersistedRunState::new(
            WorkloadName::new(base).expect("valid name"),
            "ghcr.io/example/server:1",
            TransportConfig::new(TransportType::StreamableHttp),
        );
        if let Some(url) = remote_url {
            return state.with_remote_url(url).with_group("remote-tools");
        }
        state
    }

    async fn host_catalog() -> HostFixture {
        let engine = InMemoryContainerEngine::new();
        for info in [
            container("c1", "alpha", ContainerState::Running, true),
            container("c2", "beta", ContainerState::Exited, true),
        ] {
            engine.insert(info).expect("insert");
        }
        let states = Arc::new(InMemoryRunStateStore::new());
        for state in [
            saved("live-remote", Some("https://tools.example.com/mcp")),
            saved("idle-remote", Some("https://idle.example.com/mcp")),
            saved("alpha", Some("https://shadowed.example.com/mcp")),
        ] {
            states.save(&state).await.expect("save");
        }
        let proxies = Arc::new(InMemoryProxyProcesses::new());
        proxies
            .set_running(&WorkloadName::new("live-remote").expect("valid name"), true)
            .expect("set running");
        let catalog = HostWorkloadCatalog::new(
            Arc::new(engine),
            Arc::clone(&states),
            proxies,
            Arc::new(DefaultClock),
        );
        HostFixture { states, catalog }
    }

    #[rstest]
    #[case(false, &["alpha", "live-remote"])]
    #[case(true, &["alpha", "beta", "idle-remote", "live-remote"])]
    #[tokio::test(flavor = "multi_thread")]
    async fn host_catalog_merges_remote_states(
        #[case] include_stopped: bool,
        #[case] expected: &[&str],
    ) {
        let fixture = host_catalog().await;
        let workloads = fixture
            .catalog
            .list_workloads(include_stopped)
            .await
            .expect("list");

        let mut names: Vec<&str> = workloads.iter().map(Workload::name).collect();
        names.sort_unstable();
        assert_eq!(names, expected);
        assert!(
            workloads
                .iter()
                .filter(|workload| workload.name().ends_with("-remote"))
                .all(Workload::is_remote)
        );
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn host_catalog_finds_remote_workload_by_name() {
        let fixture = host_catalog().await;

        let workload = fixture
            .catalog
            .get_workload("live-remote")
            .await
            .expect("remote workload");

        assert!(workload.is_remote());
        assert_eq!(workload.status(), WorkloadStatus::Running);
        assert_eq!(workload.package(), "https://tools.example.com/mcp");
        assert_eq!(workload.group(), Some("remote-tools"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn host_catalog_does_not_report_local_state_as_a_workload() {
        let fixture = host_catalog().await;
        fixture
            .states
            .save(&saved("gamma", None))
            .await
            .expect("save");

        let result = fixture.catalog.get_workload("gamma").await;

        assert!(matches!(result, Err(WorkloadCatalogError::NotFound(name)) if name == "gamma"));
    }
}
