//! Container label vocabulary for managed workloads.

use std::collections::BTreeMap;

/// Marks a container as managed. The value must be `"true"`.
pub const LABEL_MANAGED: &str = "caretaker";
/// User-facing workload name.
pub const LABEL_NAME: &str = "caretaker-name";
/// Canonical base name keying persisted state, PID records and logs.
pub const LABEL_BASE_NAME: &str = "caretaker-basename";
/// Transport type in canonical string form.
pub const LABEL_TRANSPORT: &str = "caretaker-transport";
/// Proxy port the workload is reachable on.
pub const LABEL_PORT: &str = "caretaker-port";
/// Tool type, for example `mcp`.
pub const LABEL_TOOL_TYPE: &str = "caretaker-tool-type";
/// Group the workload belongs to.
pub const LABEL_GROUP: &str = "caretaker-group";
/// Marks auxiliary workloads that have no supervising proxy.
pub const LABEL_AUXILIARY: &str = "caretaker-auxiliary";

/// Label map as reported by the container engine.
pub type Labels = BTreeMap<String, String>;

fn non_empty<'a>(labels: &'a Labels, key: &str) -> Option<&'a str> {
    labels
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// Returns whether the labels mark a managed container.
#[must_use]
pub fn is_managed(labels: &Labels) -> bool {
    labels
        .get(LABEL_MANAGED)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Returns whether the labels mark an auxiliary workload.
#[must_use]
pub fn is_auxiliary(labels: &Labels) -> bool {
    labels
        .get(LABEL_AUXILIARY)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Returns the workload name label, if present.
#[must_use]
pub fn workload_name(labels: &Labels) -> Option<&str> {
    non_empty(labels, LABEL_NAME)
}

/// Returns the base name label, if present.
#[must_use]
pub fn base_name(labels: &Labels) -> Option<&str> {
    non_empty(labels, LABEL_BASE_NAME)
}

/// Returns the transport label, if present.
#[must_use]
pub fn transport(labels: &Labels) -> Option<&str> {
    non_empty(labels, LABEL_TRANSPORT)
}

/// Returns the tool type label, if present.
#[must_use]
pub fn tool_type(labels: &Labels) -> Option<&str> {
    non_empty(labels, LABEL_TOOL_TYPE)
}

/// Returns the group label, if present.
#[must_use]
pub fn group(labels: &Labels) -> Option<&str> {
    non_empty(labels, LABEL_GROUP)
}

/// Returns the proxy port label when it parses as a port number.
#[must_use]
pub fn port(labels: &Labels) -> Option<u16> {
    non_empty(labels, LABEL_PORT).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn managed_requires_true_value() {
        assert!(is_managed(&labels(&[(LABEL_MANAGED, "true")])));
        assert!(!is_managed(&labels(&[(LABEL_MANAGED, "false")])));
        assert!(!is_managed(&labels(&[])));
    }

    #[test]
    fn blank_base_name_is_absent() {
        assert_eq!(base_name(&labels(&[(LABEL_BASE_NAME, " ")])), None);
        assert_eq!(
            base_name(&labels(&[(LABEL_BASE_NAME, "fetch")])),
            Some("fetch")
        );
    }

    #[test]
    fn port_ignores_garbage() {
        assert_eq!(port(&labels(&[(LABEL_PORT, "8080")])), Some(8080));
        assert_eq!(port(&labels(&[(LABEL_PORT, "http")])), None);
    }
}
