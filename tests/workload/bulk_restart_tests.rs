//! In-memory integration tests for bulk restarts.

use super::helpers::{Host, host, workload_name};
use caretaker::workload::{
    adapters::memory::RecordingLauncher, domain::ContainerState, ports::ProxyProcesses,
    services::BulkRestartError,
};
use rstest::rstest;
use std::time::{Duration, Instant};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restart_all_with_no_workloads_is_nothing_to_do(host: Host) {
    let summary = host.bulk().restart_all().await.expect("restart all");

    assert!(summary.is_nothing_to_do());
    assert_eq!(summary.to_string(), "Restart summary: 0 succeeded, 0 failed\n");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_missing_state_fails_only_that_workload(host: Host) {
    for name in ["alpha", "beta", "gamma"] {
        host.add_container(name, ContainerState::Exited);
    }
    host.save_state("alpha").await;
    host.save_state("gamma").await;

    let Err(BulkRestartError::Failed { summary }) = host.bulk().restart_all().await else {
        panic!("expected the bulk restart to fail");
    };

    assert_eq!((summary.restarted(), summary.failed()), (2, 1));
    assert_eq!(
        summary.to_string(),
        "Restart summary: 2 succeeded, 1 failed\n\
         Failed restarts:\n  \
         - beta: no saved run state for workload beta\n"
    );
    let mut launched = host.launched();
    launched.sort();
    assert_eq!(launched, ["alpha", "gamma"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn running_workloads_count_as_restarted_without_relaunch(host: Host) {
    host.add_container("alpha", ContainerState::Running);
    host.set_proxy("alpha", true);

    let summary = host.bulk().restart_all().await.expect("restart all");

    assert_eq!(summary.restarted(), 1);
    assert!(host.launched().is_empty());
    assert!(host.engine.stop_calls().expect("stop calls").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_names_fail_at_initiation(host: Host) {
    host.save_state("alpha").await;

    let Err(BulkRestartError::Failed { summary }) =
        host.bulk().restart(&["alpha", "../escape"]).await
    else {
        panic!("expected the bulk restart to fail");
    };

    assert_eq!((summary.restarted(), summary.failed()), (1, 1));
    assert!(summary.errors().iter().all(|error| error.starts_with("../escape: ")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn launch_failure_fails_only_that_workload(host: Host) {
    for name in ["alpha", "beta", "gamma"] {
        host.add_container(name, ContainerState::Exited);
        host.save_state(name).await;
    }
    host.launcher
        .fail_for(workload_name("beta"))
        .expect("fail beta launches");

    let Err(BulkRestartError::Failed { summary }) = host.bulk().restart_all().await else {
        panic!("expected the bulk restart to fail");
    };

    let outcomes: Vec<(&str, bool)> = summary
        .outcomes()
        .iter()
        .map(|outcome| (outcome.name(), outcome.is_success()))
        .collect();
    assert_eq!(outcomes, [("alpha", true), ("beta", false), ("gamma", true)]);
    assert_eq!(
        summary.errors(),
        ["beta: failed to launch workload: launch of beta rejected"]
    );
    assert!(!host.proxies.is_running(&workload_name("beta")).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn saved_remote_workload_is_restarted_without_an_engine(host: Host) {
    host.add_container("alpha", ContainerState::Exited);
    host.save_state("alpha").await;
    host.save_remote_state("remote").await;

    let summary = host.bulk().restart_all().await.expect("restart all");

    assert_eq!(summary.restarted(), 2);
    let mut binding: Vec<(String, bool)> = host
        .launcher
        .launches()
        .expect("launches")
        .into_iter()
        .map(|launch| (launch.base_name.to_string(), launch.engine_bound))
        .collect();
    binding.sort();
    assert_eq!(
        binding,
        [("alpha".to_owned(), true), ("remote".to_owned(), false)]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_launches_overlap_across_workloads() {
    let delay = Duration::from_millis(200);
    let host = Host::with_launcher(RecordingLauncher::new().with_delay(delay));
    for name in ["alpha", "beta", "gamma"] {
        host.add_container(name, ContainerState::Exited);
        host.save_state(name).await;
    }

    let started = Instant::now();
    let summary = host.bulk().restart_all().await.expect("restart all");
    let elapsed = started.elapsed();

    assert_eq!(summary.restarted(), 3);
    assert!(elapsed >= delay, "launches finished after {elapsed:?}");
    assert!(elapsed < delay * 3, "launches ran in sequence: {elapsed:?}");
}
