//! Domain model for workload lifecycle reconciliation.
//!
//! The workload domain models validated names, engine observations, persisted
//! launch configuration, proxy PID records, the reconciliation decision table
//! and restart summaries. Infrastructure concerns remain outside this
//! boundary.

mod container;
mod error;
pub mod labels;
mod name;
mod pid_record;
mod reconcile;
mod restart;
mod run_state;
mod status;
mod transport;
mod workload;

pub use container::{ContainerId, ContainerInfo, ContainerState};
pub use error::{ParseTransportTypeError, ParseWorkloadStatusError, WorkloadDomainError};
pub use name::WorkloadName;
pub use pid_record::{IdentityToken, ProxyProcessRecord};
pub use reconcile::{ReconcileAction, ReconcileObservation};
pub use restart::{RestartOutcome, RestartSummary};
pub use run_state::{PermissionProfile, PersistedRunState};
pub use status::WorkloadStatus;
pub use transport::{DEFAULT_PROXY_HOST, TransportConfig, TransportType};
pub use workload::Workload;
