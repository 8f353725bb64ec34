//! Orchestration services for workload lifecycle reconciliation.

mod auxiliary;
mod bulk;
mod loader;
mod logs;
mod readiness;
mod reconcile;

pub use auxiliary::{AuxiliaryError, AuxiliaryLauncher, AuxiliaryResult};
pub use bulk::{BulkRestartError, BulkRestartOrchestrator, BulkRestartResult, ReconcilingInitiator};
pub use loader::RunStateLoader;
pub use logs::{LogDirectory, LogError, LogFollower, LogPruner, LogResult, PruneReport};
pub use readiness::{ReadinessError, ReadinessPoller, ReadinessResult};
pub use reconcile::{LifecycleReconciler, ReconcileError, ReconcileResult};
