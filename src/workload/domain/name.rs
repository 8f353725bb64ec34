//! Validated workload names.
//!
//! Workload names and base names key files on disk (PID records, run state,
//! logs), so every name crossing into the core is validated against path
//! traversal and shell metacharacters first.

use super::WorkloadDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a workload name.
const MAX_WORKLOAD_NAME_LENGTH: usize = 100;

/// Characters rejected because they are meaningful to a shell.
const SHELL_METACHARACTERS: [char; 5] = ['$', '&', ';', '|', '`'];

/// Validated workload or base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkloadName(String);

impl WorkloadName {
    /// Creates a validated workload name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadDomainError`] when the name is empty, escapes its
    /// directory, is absolute, contains shell metacharacters or NUL bytes,
    /// uses characters outside `[A-Za-z0-9._-]`, or exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkloadDomainError> {
        let name = value.into();

        if name.is_empty() {
            return Err(WorkloadDomainError::EmptyWorkloadName);
        }

        if name.contains('\0') {
            return Err(WorkloadDomainError::NullByte);
        }

        if name.starts_with('/') || name.starts_with('\\') {
            return Err(WorkloadDomainError::AbsolutePath(name));
        }

        if escapes_directory(&name) {
            return Err(WorkloadDomainError::PathTraversal(name));
        }

        if name.contains(SHELL_METACHARACTERS) {
            return Err(WorkloadDomainError::DangerousCharacters(name));
        }

        let is_valid = name.chars().all(|character| {
            character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_')
        });
        if !is_valid {
            return Err(WorkloadDomainError::InvalidWorkloadName(name));
        }

        if name.len() > MAX_WORKLOAD_NAME_LENGTH {
            return Err(WorkloadDomainError::WorkloadNameTooLong(name));
        }

        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name used for this name with the given extension.
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.0)
    }
}

/// Lexically cleans `name` as a relative path and reports whether the
/// result leaves its starting directory.
fn escapes_directory(name: &str) -> bool {
    let mut components: Vec<&str> = Vec::new();
    for component in name.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => {
                if components.pop().is_none() {
                    return true;
                }
            }
            other => components.push(other),
        }
    }

    components.first().is_none_or(|first| first.starts_with(".."))
}

impl TryFrom<String> for WorkloadName {
    type Error = WorkloadDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkloadName> for String {
    fn from(value: WorkloadName) -> Self {
        value.0
    }
}

impl AsRef<str> for WorkloadName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WorkloadName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
