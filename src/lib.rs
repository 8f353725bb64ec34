//! Caretaker: lifecycle reconciliation for host-managed workloads.
//!
//! This crate keeps long-lived workloads (containerized or process-backed
//! servers, each fronted by a supervising proxy process) in a running state.
//! It decides how to bring a named workload back up from inconsistent
//! observed state, restarts many workloads concurrently while isolating
//! failures, checks proxy liveness through PID records, polls freshly
//! launched workloads for readiness, and follows and prunes workload logs.
//!
//! # Architecture
//!
//! Caretaker follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (PID files, JSON state,
//!   processes, in-memory test doubles)
//!
//! # Modules
//!
//! - [`workload`]: Workload domain, ports, adapters and services
//! - [`config`]: Explicit host configuration context
//! - [`telemetry`]: Structured logging setup

pub mod config;
pub mod telemetry;
pub mod workload;

mod fs_utils;
#[cfg(test)]
mod test_support;
