//! In-memory adapters for deterministic tests and local orchestration.

mod engine;
mod launcher;
mod proxy;
mod run_state;

pub use engine::InMemoryContainerEngine;
pub use launcher::{RecordedLaunch, RecordingLauncher};
pub use proxy::InMemoryProxyProcesses;
pub use run_state::InMemoryRunStateStore;
