//! Error types for workload domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing workload domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkloadDomainError {
    /// The workload name is empty.
    #[error("workload name must not be empty")]
    EmptyWorkloadName,

    /// The workload name would escape the directory it keys files in.
    #[error("workload name '{0}' contains path traversal")]
    PathTraversal(String),

    /// The workload name is an absolute path.
    #[error("workload name '{0}' must not be an absolute path")]
    AbsolutePath(String),

    /// The workload name contains shell metacharacters.
    #[error("workload name '{0}' contains potentially dangerous characters")]
    DangerousCharacters(String),

    /// The workload name contains a NUL byte.
    #[error("workload name contains null bytes")]
    NullByte,

    /// The workload name contains characters outside `[A-Za-z0-9._-]`.
    #[error(
        "workload name '{0}' can only contain alphanumeric characters, dots, hyphens, and underscores"
    )]
    InvalidWorkloadName(String),

    /// The workload name exceeds the 100-character limit.
    #[error("workload name exceeds 100 character limit: {0}")]
    WorkloadNameTooLong(String),

    /// A PID record did not start with a decimal process identifier.
    #[error("malformed proxy process record: {0}")]
    MalformedPidRecord(String),
}

/// Error returned while parsing a workload status string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown workload status: {0}")]
pub struct ParseWorkloadStatusError(pub String);

/// Error returned while parsing a transport type string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown transport type: {0}")]
pub struct ParseTransportTypeError(pub String);
