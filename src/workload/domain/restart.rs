//! Per-workload restart outcomes and their aggregate summary.

use std::fmt;

/// Result of one workload's restart attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartOutcome {
    name: String,
    succeeded: bool,
    error: Option<String>,
}

impl RestartOutcome {
    /// Records a successful restart.
    #[must_use]
    pub fn succeeded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: true,
            error: None,
        }
    }

    /// Records a failed restart.
    #[must_use]
    pub fn failed(name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            succeeded: false,
            error: Some(error.to_string()),
        }
    }

    /// Returns the workload name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the restart succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.succeeded
    }

    /// Returns the failure message, if the restart failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Aggregate of a bulk restart.
///
/// Outcomes are ordered by workload name, so the summary is identical
/// regardless of the order in which restarts completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestartSummary {
    restarted: usize,
    failed: usize,
    errors: Vec<String>,
    outcomes: Vec<RestartOutcome>,
}

impl RestartSummary {
    /// Builds a summary from individual outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = RestartOutcome>) -> Self {
        let mut sorted: Vec<RestartOutcome> = outcomes.into_iter().collect();
        sorted.sort_by(|left, right| left.name.cmp(&right.name));

        let restarted = sorted.iter().filter(|outcome| outcome.succeeded).count();
        let errors: Vec<String> = sorted
            .iter()
            .filter_map(|outcome| {
                outcome
                    .error
                    .as_ref()
                    .map(|error| format!("{}: {error}", outcome.name))
            })
            .collect();

        Self {
            restarted,
            failed: sorted.len() - restarted,
            errors,
            outcomes: sorted,
        }
    }

    /// Returns the number of workloads restarted successfully.
    #[must_use]
    pub const fn restarted(&self) -> usize {
        self.restarted
    }

    /// Returns the number of workloads that failed to restart.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Returns one human-readable message per failure, prefixed by name.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns every outcome, ordered by workload name.
    #[must_use]
    pub fn outcomes(&self) -> &[RestartOutcome] {
        &self.outcomes
    }

    /// Returns whether every restart succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns whether there were no workloads to restart.
    #[must_use]
    pub const fn is_nothing_to_do(&self) -> bool {
        self.restarted == 0 && self.failed == 0
    }
}

impl fmt::Display for RestartSummary {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            formatter,
            "Restart summary: {} succeeded, {} failed",
            self.restarted, self.failed
        )?;
        if !self.errors.is_empty() {
            writeln!(formatter, "Failed restarts:")?;
            for error in &self.errors {
                writeln!(formatter, "  - {error}")?;
            }
        }
        Ok(())
    }
}
