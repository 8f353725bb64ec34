//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "caretaker=info";

/// Installs a formatted subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
///
/// Returns `false` when a global subscriber was already installed.
#[must_use]
pub fn init_logging(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
