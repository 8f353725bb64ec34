//! Shared fixtures for in-memory workload integration tests.

use caretaker::workload::{
    adapters::{
        HostWorkloadCatalog,
        memory::{
            InMemoryContainerEngine, InMemoryProxyProcesses, InMemoryRunStateStore,
            RecordingLauncher,
        },
    },
    domain::{
        ContainerId, ContainerInfo, ContainerState, PersistedRunState, TransportConfig,
        TransportType, WorkloadName, labels,
    },
    ports::RunStateStore,
    services::{BulkRestartOrchestrator, LifecycleReconciler, ReconcilingInitiator, RunStateLoader},
};
use chrono::Utc;
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Reconciler wired to in-memory adapters.
pub type TestReconciler = LifecycleReconciler<
    InMemoryContainerEngine,
    InMemoryProxyProcesses,
    InMemoryRunStateStore,
    RecordingLauncher,
>;

/// Bulk orchestrator wired to in-memory adapters.
pub type TestBulk = BulkRestartOrchestrator<
    HostWorkloadCatalog<
        InMemoryContainerEngine,
        InMemoryRunStateStore,
        InMemoryProxyProcesses,
        DefaultClock,
    >,
    ReconcilingInitiator<
        InMemoryContainerEngine,
        InMemoryProxyProcesses,
        InMemoryRunStateStore,
        RecordingLauncher,
    >,
>;

/// In-memory host with every port shared between the services under test.
pub struct Host {
    /// Container engine.
    pub engine: Arc<InMemoryContainerEngine>,
    /// Proxy process tracker; launches mark proxies alive.
    pub proxies: Arc<InMemoryProxyProcesses>,
    /// Saved run states.
    pub store: Arc<InMemoryRunStateStore>,
    /// Launch recorder.
    pub launcher: Arc<RecordingLauncher>,
    /// Reconciler under test.
    pub reconciler: Arc<TestReconciler>,
}

impl Host {
    /// Builds a bulk orchestrator over this host.
    #[must_use]
    pub fn bulk(&self) -> TestBulk {
        BulkRestartOrchestrator::new(
            Arc::new(HostWorkloadCatalog::new(
                Arc::clone(&self.engine),
                Arc::clone(&self.store),
                Arc::clone(&self.proxies),
                Arc::new(DefaultClock),
            )),
            Arc::new(ReconcilingInitiator::new(Arc::clone(&self.reconciler))),
        )
    }

    /// Saves launch state for a remote workload named `name`.
    pub async fn save_remote_state(&self, name: &str) {
        self.store
            .save(&stdio_state(name).with_remote_url(format!("https://{name}.example.com/mcp")))
            .await
            .expect("save remote run state");
    }

    /// Adds a managed container.
    pub fn add_container(&self, name: &str, state: ContainerState) {
        self.engine
            .insert(managed_container(name, state))
            .expect("insert container");
    }

    /// Saves launch state for `name`.
    pub async fn save_state(&self, name: &str) {
        self.store
            .save(&stdio_state(name))
            .await
            .expect("save run state");
    }

    /// Marks the proxy of `name` alive or dead.
    pub fn set_proxy(&self, name: &str, running: bool) {
        self.proxies
            .set_running(&workload_name(name), running)
            .expect("set proxy liveness");
    }

    /// Returns the base names launched so far.
    #[must_use]
    pub fn launched(&self) -> Vec<String> {
        self.launcher
            .launches()
            .expect("launches")
            .into_iter()
            .map(|launch| launch.base_name.to_string())
            .collect()
    }
}

/// Provides a fresh in-memory host.
#[fixture]
pub fn host() -> Host {
    Host::with_launcher(RecordingLauncher::new())
}

impl Host {
    /// Builds a host around `launcher`, which records proxies into the
    /// host's tracker.
    #[must_use]
    pub fn with_launcher(launcher: RecordingLauncher) -> Self {
        let engine = Arc::new(InMemoryContainerEngine::new());
        let proxies = Arc::new(InMemoryProxyProcesses::new());
        let store = Arc::new(InMemoryRunStateStore::new());
        let launcher = Arc::new(launcher.with_proxies(Arc::clone(&proxies)));
        let reconciler = Arc::new(LifecycleReconciler::new(
            Arc::clone(&engine),
            Arc::clone(&proxies),
            RunStateLoader::new(Arc::clone(&store)),
            Arc::clone(&launcher),
        ));
        Self {
            engine,
            proxies,
            store,
            launcher,
            reconciler,
        }
    }
}

/// Parses a known-valid workload name.
#[must_use]
pub fn workload_name(value: &str) -> WorkloadName {
    WorkloadName::new(value).expect("valid workload name")
}

/// Returns the container identifier used for `name`.
#[must_use]
pub fn container_id(name: &str) -> ContainerId {
    ContainerId::new(format!("{name}-container"))
}

/// Builds a managed container whose workload and base names are `name`.
#[must_use]
pub fn managed_container(name: &str, state: ContainerState) -> ContainerInfo {
    ContainerInfo::new(container_id(name), name, state, Utc::now())
        .with_image("ghcr.io/example/server:1")
        .with_labels([
            (labels::LABEL_MANAGED.to_owned(), "true".to_owned()),
            (labels::LABEL_NAME.to_owned(), name.to_owned()),
            (labels::LABEL_BASE_NAME.to_owned(), name.to_owned()),
        ])
}

/// Builds stdio launch state for `name`.
#[must_use]
pub fn stdio_state(name: &str) -> PersistedRunState {
    PersistedRunState::new(
        workload_name(name),
        "ghcr.io/example/server:1",
        TransportConfig::new(TransportType::Stdio),
    )
}
