//! Reconciliation decision table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed state feeding a reconciliation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileObservation {
    /// Whether the engine knows a container for the workload.
    pub container_found: bool,
    /// Whether the engine reports that container as running.
    pub running: bool,
    /// Whether the supervising proxy process is alive.
    pub proxy_running: bool,
}

/// Action required to bring a workload back to a running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    /// Container and proxy are both running; nothing to do.
    AlreadyRunning,
    /// The container ran without its proxy; it was stopped, then resumed.
    StoppedAndResumed,
    /// Nothing was running; resumed from persisted state.
    Resumed,
}

impl ReconcileAction {
    /// Applies the decision table to an observation.
    ///
    /// Rows are evaluated in order: both running is a no-op, a running
    /// container with a dead proxy must be stopped first, anything else
    /// resumes directly.
    #[must_use]
    pub const fn decide(observation: ReconcileObservation) -> Self {
        if observation.running && observation.proxy_running {
            return Self::AlreadyRunning;
        }

        if observation.container_found && observation.running {
            return Self::StoppedAndResumed;
        }

        Self::Resumed
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyRunning => "already_running",
            Self::StoppedAndResumed => "stopped_and_resumed",
            Self::Resumed => "resumed",
        }
    }

    /// Returns whether the action launches the workload.
    #[must_use]
    pub const fn launches(self) -> bool {
        !matches!(self, Self::AlreadyRunning)
    }
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, true, true, ReconcileAction::AlreadyRunning)]
    #[case(true, true, false, ReconcileAction::StoppedAndResumed)]
    #[case(true, false, true, ReconcileAction::Resumed)]
    #[case(true, false, false, ReconcileAction::Resumed)]
    #[case(false, false, true, ReconcileAction::Resumed)]
    #[case(false, false, false, ReconcileAction::Resumed)]
    fn decision_table(
        #[case] container_found: bool,
        #[case] running: bool,
        #[case] proxy_running: bool,
        #[case] expected: ReconcileAction,
    ) {
        let observation = ReconcileObservation {
            container_found,
            running,
            proxy_running,
        };
        assert_eq!(ReconcileAction::decide(observation), expected);
    }
}
