//! Integration tests for the file-backed adapters built by `HostContext`.

use super::helpers::{managed_container, stdio_state, workload_name};
use camino::Utf8PathBuf;
use caretaker::{
    config::{HostContext, Settings},
    workload::{
        adapters::memory::{InMemoryContainerEngine, RecordingLauncher},
        domain::{ContainerState, ProxyProcessRecord, ReconcileAction},
        ports::{ProxyProcesses, RunStateStore},
        services::{LifecycleReconciler, LogPruner, RunStateLoader},
    },
};
use envconfig::Envconfig;
use rstest::{fixture, rstest};
use std::{collections::HashMap, sync::Arc};
use tempfile::TempDir;

struct DataRoot {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl DataRoot {
    fn context(&self) -> HostContext {
        let settings = Settings::init_from_hashmap(&HashMap::from([(
            "CARETAKER_DATA_DIR".to_owned(),
            self.root.to_string(),
        )]))
        .expect("settings");
        HostContext::new(settings).expect("host context")
    }
}

#[fixture]
fn data_root() -> DataRoot {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp dir");
    DataRoot { _temp: temp, root }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn saved_state_is_visible_to_a_fresh_context(data_root: DataRoot) {
    data_root
        .context()
        .run_state_store()
        .save(&stdio_state("fetch"))
        .await
        .expect("save");

    let loaded = data_root
        .context()
        .run_state_store()
        .load(&workload_name("fetch"))
        .await
        .expect("load");

    assert_eq!(loaded, stdio_state("fetch"));
}

#[cfg(unix)]
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn live_pid_file_keeps_running_workload_alone(data_root: DataRoot) {
    let context = data_root.context();
    let proxies = Arc::new(context.proxy_processes());
    proxies
        .record(&workload_name("fetch"), ProxyProcessRecord::new(std::process::id()))
        .await
        .expect("record pid");
    let engine = Arc::new(InMemoryContainerEngine::new());
    engine
        .insert(managed_container("fetch", ContainerState::Running))
        .expect("insert");
    let launcher = Arc::new(RecordingLauncher::new());
    let reconciler = LifecycleReconciler::new(
        Arc::clone(&engine),
        proxies,
        RunStateLoader::new(Arc::new(context.run_state_store())),
        Arc::clone(&launcher),
    );

    let action = reconciler.reconcile("fetch").await.expect("reconcile");

    assert_eq!(action, ReconcileAction::AlreadyRunning);
    assert!(launcher.launches().expect("launches").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn prune_removes_only_unmanaged_logs(data_root: DataRoot) {
    let context = data_root.context();
    let logs = context.log_directory();
    std::fs::create_dir_all(logs.dir()).expect("create logs dir");
    for file in ["fetch.log", "remote.log", "orphan.log", "notes.txt"] {
        std::fs::write(logs.dir().join(file), "line\n").expect("write log");
    }
    context
        .run_state_store()
        .save(&stdio_state("remote").with_remote_url("https://remote.example.com/mcp"))
        .await
        .expect("save remote state");
    let engine = Arc::new(InMemoryContainerEngine::new());
    engine
        .insert(managed_container("fetch", ContainerState::Exited))
        .expect("insert");
    let pruner = LogPruner::new(Arc::new(context.workload_catalog(engine)), logs.clone());

    let report = pruner.prune().await.expect("prune");

    assert_eq!(report.removed, [logs.dir().join("orphan.log")]);
    assert!(report.errors.is_empty());
    assert_eq!(
        logs.read_all(&workload_name("fetch")).expect("read fetch log"),
        "line\n"
    );
    assert!(logs.dir().join("remote.log").exists());
    assert!(logs.dir().join("notes.txt").exists());
}

#[rstest]
fn config_updates_survive_reload(data_root: DataRoot) {
    let updated = data_root
        .context()
        .config()
        .update(|config| {
            config.auto_discovery = true;
            config.registered_clients.push("editor".to_owned());
        })
        .expect("update");

    let reloaded = data_root.context().config().current().expect("current");

    assert_eq!(reloaded, updated);
    assert!(reloaded.auto_discovery);
}
