//! Port contracts for workload lifecycle reconciliation.

mod catalog;
mod engine;
mod launcher;
mod proxy;
mod restart;
mod run_state;

pub use catalog::{WorkloadCatalog, WorkloadCatalogError, WorkloadCatalogResult};
pub use engine::{ContainerEngine, ContainerEngineError, ContainerEngineResult};
pub use launcher::{LaunchError, LaunchMode, LaunchResult, RunConfig, WorkloadLauncher};
pub use proxy::{ProxyProcessError, ProxyProcessResult, ProxyProcesses};
pub use restart::{RestartError, RestartHandle, RestartInitiator, RestartTaskResult};
pub use run_state::{RunStateError, RunStateResult, RunStateStore};
