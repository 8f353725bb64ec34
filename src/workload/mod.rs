//! Workload lifecycle reconciliation and orchestration.
//!
//! This module decides what brings a named workload back to a running
//! state, fans restarts out across workloads, checks supervising proxies,
//! waits for readiness and manages workload logs. It follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
