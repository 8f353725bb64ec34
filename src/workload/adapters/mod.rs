//! Adapter implementations for workload lifecycle ports.

pub mod memory;

mod catalog;
mod pid_file;
mod process;
mod process_launcher;
mod run_state_file;

pub use catalog::{EngineWorkloadCatalog, HostWorkloadCatalog};
pub use pid_file::PidFileProxyProcesses;
pub use process_launcher::{DETACHED_ENV, DetachedProcessLauncher};
pub use run_state_file::JsonRunStateStore;
