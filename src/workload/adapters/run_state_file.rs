//! JSON file backed run-state store.

use crate::fs_utils;
use crate::workload::{
    domain::{PersistedRunState, WorkloadName},
    ports::{RunStateError, RunStateResult, RunStateStore},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;

const STATE_EXTENSION: &str = "json";

/// Stores each workload's launch configuration as `<base>.json`.
#[derive(Debug, Clone)]
pub struct JsonRunStateStore {
    dir: Utf8PathBuf,
}

impl JsonRunStateStore {
    /// Creates a store over `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the state directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

#[async_trait]
impl RunStateStore for JsonRunStateStore {
    async fn load(&self, base_name: &WorkloadName) -> RunStateResult<PersistedRunState> {
        let contents = fs_utils::read_optional(&self.dir, &base_name.file_name(STATE_EXTENSION))
            .map_err(RunStateError::persistence)?
            .ok_or_else(|| RunStateError::NotFound(base_name.clone()))?;

        serde_json::from_str(&contents)
            .map_err(|err| RunStateError::invalid_state(base_name.clone(), err))
    }

    async fn save(&self, state: &PersistedRunState) -> RunStateResult<()> {
        let contents = serde_json::to_string_pretty(state).map_err(RunStateError::persistence)?;
        fs_utils::write_atomic(
            &self.dir,
            &state.base_name().file_name(STATE_EXTENSION),
            &contents,
        )
        .map_err(RunStateError::persistence)
    }

    async fn delete(&self, base_name: &WorkloadName) -> RunStateResult<()> {
        fs_utils::remove_optional(&self.dir, &base_name.file_name(STATE_EXTENSION))
            .map_err(RunStateError::persistence)
    }

    async fn list(&self) -> RunStateResult<Vec<WorkloadName>> {
        let stems = fs_utils::list_file_stems(&self.dir, STATE_EXTENSION)
            .map_err(RunStateError::persistence)?;
        Ok(stems
            .into_iter()
            .filter_map(|stem| {
                WorkloadName::new(stem.as_str())
                    .inspect_err(|err| {
                        warn!(file = %stem, error = %err, "ignoring state file with invalid name");
                    })
                    .ok()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::domain::{TransportConfig, TransportType};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn store() -> (TempDir, JsonRunStateStore) {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().join("state")).expect("utf-8 path");
        (temp, JsonRunStateStore::new(dir))
    }

    fn name(value: &str) -> WorkloadName {
        WorkloadName::new(value).expect("valid name")
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn saved_state_loads_back(store: (TempDir, JsonRunStateStore)) {
        let (_temp, states) = store;
        let state = PersistedRunState::new(
            name("fetch"),
            "ghcr.io/example/fetch:1",
            TransportConfig::new(TransportType::Sse).with_proxy_port(8080),
        )
        .with_cmd_args(["--verbose".to_owned()]);

        states.save(&state).await.expect("save");
        let loaded = states.load(&name("fetch")).await.expect("load");

        assert_eq!(loaded, state);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_state_is_not_found(store: (TempDir, JsonRunStateStore)) {
        let (_temp, states) = store;
        let result = states.load(&name("fetch")).await;
        assert!(matches!(result, Err(RunStateError::NotFound(found)) if found.as_str() == "fetch"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn corrupt_state_is_invalid(store: (TempDir, JsonRunStateStore)) {
        let (_temp, states) = store;
        fs_utils::write_atomic(states.dir(), "fetch.json", "{ not json").expect("write");

        let result = states.load(&name("fetch")).await;
        assert!(matches!(result, Err(RunStateError::InvalidState { .. })));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn list_returns_saved_names_and_skips_other_files(store: (TempDir, JsonRunStateStore)) {
        let (_temp, states) = store;
        assert!(states.list().await.expect("list missing dir").is_empty());
        for base in ["beta", "alpha"] {
            let state = PersistedRunState::new(
                name(base),
                "ghcr.io/example/fetch:1",
                TransportConfig::new(TransportType::Stdio),
            );
            states.save(&state).await.expect("save");
        }
        fs_utils::write_atomic(states.dir(), "notes.txt", "ignored").expect("write");
        fs_utils::write_atomic(states.dir(), "bad name!.json", "{}").expect("write");

        let names = states.list().await.expect("list");

        assert_eq!(names, [name("alpha"), name("beta")]);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn delete_is_idempotent(store: (TempDir, JsonRunStateStore)) {
        let (_temp, states) = store;
        states.delete(&name("fetch")).await.expect("delete missing");
    }
}
