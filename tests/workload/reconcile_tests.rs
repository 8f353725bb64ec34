//! In-memory integration tests for single-workload reconciliation.

use super::helpers::{Host, container_id, host, workload_name};
use caretaker::workload::{
    domain::{ContainerState, ReconcileAction},
    ports::RunStateError,
    services::ReconcileError,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn orphaned_container_is_stopped_and_resumed_then_left_alone(host: Host) {
    host.add_container("fetch", ContainerState::Running);
    host.save_state("fetch").await;

    let first = host.reconciler.reconcile("fetch").await.expect("reconcile");
    assert_eq!(first, ReconcileAction::StoppedAndResumed);
    assert_eq!(
        host.engine.stop_calls().expect("stop calls"),
        [container_id("fetch")]
    );
    assert_eq!(host.launched(), ["fetch"]);

    host.add_container("fetch", ContainerState::Running);
    let second = host.reconciler.reconcile("fetch").await.expect("reconcile");
    assert_eq!(second, ReconcileAction::AlreadyRunning);
    assert_eq!(host.engine.stop_calls().expect("stop calls").len(), 1);
    assert_eq!(host.launched().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_workload_resumes_from_state_saved_under_its_name(host: Host) {
    host.save_state("fetch").await;

    let action = host.reconciler.reconcile("fetch").await.expect("reconcile");

    assert_eq!(action, ReconcileAction::Resumed);
    assert!(host.engine.stop_calls().expect("stop calls").is_empty());
    assert_eq!(
        host.store.loaded_names().expect("loads"),
        [workload_name("fetch")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopped_workload_without_state_reports_not_found(host: Host) {
    host.add_container("fetch", ContainerState::Exited);

    let result = host.reconciler.reconcile("fetch").await;

    assert!(matches!(
        result,
        Err(ReconcileError::State(RunStateError::NotFound(name))) if name.as_str() == "fetch"
    ));
    assert!(host.launched().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stop_then_reconcile_resumes(host: Host) {
    host.add_container("fetch", ContainerState::Running);
    host.save_state("fetch").await;
    host.set_proxy("fetch", true);

    host.reconciler.stop("fetch").await.expect("stop");
    assert!(matches!(
        host.reconciler.stop("fetch").await,
        Err(ReconcileError::NotRunning(_))
    ));

    let action = host.reconciler.reconcile("fetch").await.expect("reconcile");
    assert_eq!(action, ReconcileAction::Resumed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_container_stop_leaves_workload_unlaunched(host: Host) {
    host.add_container("fetch", ContainerState::Running);
    host.save_state("fetch").await;
    host.engine
        .fail_stops_for(container_id("fetch"))
        .expect("fail stops");

    let result = host.reconciler.reconcile("fetch").await;

    assert!(matches!(
        result,
        Err(ReconcileError::Stop { name, .. }) if name.as_str() == "fetch"
    ));
    assert_eq!(
        host.engine.stop_calls().expect("stop calls"),
        [container_id("fetch")]
    );
    assert!(host.launched().is_empty());
    assert!(host.store.loaded_names().expect("loads").is_empty());
}
