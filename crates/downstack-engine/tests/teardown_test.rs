//! End-to-end engine behavior against a scripted control plane.

mod common;

use common::{CancellingClock, DeleteStep, InstantClock, MockControlPlane};
use downstack_core::{LifecycleStatus, Outcome, Phase, RunConfig, SweepKind};
use downstack_engine::{CancelToken, Coordinator, Registry, StackEntry, SweepEntry};
use std::sync::Arc;
use std::time::Duration;

fn coordinator(provider: &Arc<MockControlPlane>, config: RunConfig) -> Coordinator {
    Coordinator::new(
        provider.clone(),
        Arc::new(InstantClock::new()),
        config,
        CancelToken::new(),
    )
}

fn single_stack(name: &str) -> Registry {
    let mut registry = Registry::new();
    registry.add_stack(StackEntry::new(name, "test"));
    registry
}

/// Tearing down an already-absent topology is a no-op: every resource
/// reports skipped, and the run as a whole succeeds. Twice in a row.
#[tokio::test]
async fn idempotent_rerun_on_absent_topology() {
    let provider = Arc::new(MockControlPlane::new());
    let registry = Registry::layered("demo", &["api".to_string()]);
    let coordinator = coordinator(&provider, RunConfig::default());

    for _ in 0..2 {
        let report = coordinator.run(&registry).await;
        assert!(report.is_success());
        assert_eq!(report.results.len(), registry.stacks().len());
        for result in &report.results {
            assert_eq!(result.outcome, Outcome::SkippedAlreadyAbsent);
            assert_eq!(result.attempts_used, 1);
        }
    }
    assert_eq!(provider.total_delete_count(), 0);
}

/// A deletion that is already in flight is never re-requested.
#[tokio::test]
async fn no_second_delete_request_while_in_progress() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_status(
        "stack:demo-cache",
        vec![
            LifecycleStatus::DeleteInProgress,
            LifecycleStatus::DeleteInProgress,
            LifecycleStatus::Absent,
        ],
    );

    let report = coordinator(&provider, RunConfig::default())
        .run(&single_stack("demo-cache"))
        .await;

    assert_eq!(provider.delete_count("stack:demo-cache"), 0);
    assert_eq!(report.results[0].outcome, Outcome::Deleted);
}

/// Dry run: zero mutating calls regardless of resource status, one
/// preview outcome per resource — ordered and sweep alike.
#[tokio::test]
async fn dry_run_issues_no_mutations() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_status("stack:demo-a", vec![LifecycleStatus::Active]);
    provider.script_status("stack:demo-b", vec![LifecycleStatus::DeleteInProgress]);
    // demo-c is unscripted: reads as absent
    provider.script_list(SweepKind::LogGroup, "/ecs/demo-", vec!["/ecs/demo-api"]);

    let mut registry = Registry::new();
    registry.add_stack(StackEntry::new("demo-a", "test"));
    registry.add_stack(StackEntry::new("demo-b", "test"));
    registry.add_stack(StackEntry::new("demo-c", "test"));
    registry.add_sweep(SweepEntry::new(SweepKind::LogGroup, "/ecs/demo-"));

    let config = RunConfig {
        dry_run: true,
        ..RunConfig::default()
    };
    let report = coordinator(&provider, config).run(&registry).await;

    assert_eq!(provider.total_delete_count(), 0);
    assert_eq!(report.results.len(), 4);
    for result in &report.results {
        assert_eq!(result.outcome, Outcome::DryRunPreview);
    }
}

/// Deletion acknowledged but the resource lingers for two re-checks: the
/// run succeeds after exactly three controller invocations.
#[tokio::test]
async fn verification_loop_retries_until_absent() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_status(
        "stack:demo-svc",
        vec![LifecycleStatus::Active, LifecycleStatus::Absent],
    );
    provider.script_exists("stack:demo-svc", vec![true, true, false]);

    let report = coordinator(&provider, RunConfig::default())
        .run(&single_stack("demo-svc"))
        .await;

    let result = &report.results[0];
    assert_eq!(result.outcome, Outcome::Deleted);
    assert_eq!(result.attempts_used, 3);
    assert_eq!(provider.delete_count("stack:demo-svc"), 1);
}

/// A resource that survives every verification attempt is marked failed,
/// and the run keeps going.
#[tokio::test]
async fn verification_exhaustion_marks_failed_but_run_continues() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_status(
        "stack:demo-stuck",
        vec![LifecycleStatus::Active, LifecycleStatus::Absent],
    );
    provider.script_exists("stack:demo-stuck", vec![true]);

    let mut registry = single_stack("demo-stuck");
    registry.add_stack(StackEntry::new("demo-after", "test"));

    let report = coordinator(&provider, RunConfig::default())
        .run(&registry)
        .await;

    assert_eq!(report.results[0].outcome, Outcome::Failed);
    assert_eq!(
        report.results[0].attempts_used,
        RunConfig::default().max_verification_attempts + 1
    );
    // The following stack was still processed.
    assert_eq!(report.results[1].outcome, Outcome::SkippedAlreadyAbsent);
    assert!(!report.is_success());
}

/// Ordered stacks are processed strictly sequentially: every call for A
/// happens before any call for B.
#[tokio::test]
async fn ordered_stacks_are_sequential() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_status(
        "stack:demo-a",
        vec![LifecycleStatus::Active, LifecycleStatus::Absent],
    );
    provider.script_status(
        "stack:demo-b",
        vec![LifecycleStatus::Active, LifecycleStatus::Absent],
    );

    let mut registry = Registry::new();
    registry.add_stack(StackEntry::new("demo-a", "test"));
    registry.add_stack(StackEntry::new("demo-b", "test"));

    coordinator(&provider, RunConfig::default())
        .run(&registry)
        .await;

    let events = provider.events();
    let last_a = events
        .iter()
        .rposition(|e| e.ends_with(":stack:demo-a"))
        .unwrap();
    let first_b = events
        .iter()
        .position(|e| e.ends_with(":stack:demo-b"))
        .unwrap();
    assert!(
        last_a < first_b,
        "expected all demo-a calls before demo-b: {events:?}"
    );
}

/// One failing sweep item neither aborts the sweep nor fails the run.
#[tokio::test]
async fn sweep_failure_is_isolated() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_list(
        SweepKind::LogGroup,
        "/ecs/demo-",
        vec!["/ecs/demo-bad", "/ecs/demo-good"],
    );
    provider.script_status("log-group:/ecs/demo-bad", vec![LifecycleStatus::Active]);
    provider.script_delete(
        "log-group:/ecs/demo-bad",
        vec![
            DeleteStep::Reject("resource busy"),
            DeleteStep::Reject("resource busy"),
            DeleteStep::Reject("resource busy"),
        ],
    );
    provider.script_status(
        "log-group:/ecs/demo-good",
        vec![LifecycleStatus::Active, LifecycleStatus::Absent],
    );

    let mut registry = Registry::new();
    registry.add_sweep(SweepEntry::new(SweepKind::LogGroup, "/ecs/demo-"));

    let report = coordinator(&provider, RunConfig::default())
        .run(&registry)
        .await;

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].outcome, Outcome::Failed);
    assert_eq!(report.results[0].phase, Phase::Sweep);
    assert_eq!(report.results[1].outcome, Outcome::Deleted);
    // Sweep failures never fail the run.
    assert!(report.is_success());
}

/// A sweep enumeration failure is recorded against the prefix and other
/// sweep patterns still run.
#[tokio::test]
async fn sweep_list_failure_does_not_abort_other_sweeps() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_list_error(SweepKind::LogGroup, "/ecs/demo-", "throttled");
    provider.script_list(SweepKind::Parameter, "/demo/", vec!["/demo/db-url"]);
    provider.script_status(
        "parameter:/demo/db-url",
        vec![LifecycleStatus::Active, LifecycleStatus::Absent],
    );

    let mut registry = Registry::new();
    registry.add_sweep(SweepEntry::new(SweepKind::LogGroup, "/ecs/demo-"));
    registry.add_sweep(SweepEntry::new(SweepKind::Parameter, "/demo/"));

    let report = coordinator(&provider, RunConfig::default())
        .run(&registry)
        .await;

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].outcome, Outcome::Failed);
    assert_eq!(report.results[0].name, "/ecs/demo-");
    assert_eq!(report.results[1].outcome, Outcome::Deleted);
    assert!(report.is_success());
}

/// Recovery: first query shows a failed deletion, the retried delete is
/// accepted after one rejection, and the stack drains through
/// delete-in-progress to absent. Exactly two delete requests.
#[tokio::test]
async fn delete_failed_stack_recovers_with_retried_delete() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_status(
        "stack:demo-x",
        vec![
            LifecycleStatus::DeleteFailed,
            LifecycleStatus::DeleteInProgress,
            LifecycleStatus::Absent,
        ],
    );
    provider.script_delete(
        "stack:demo-x",
        vec![DeleteStep::Transport("throttled"), DeleteStep::Accept],
    );

    let report = coordinator(&provider, RunConfig::default())
        .run(&single_stack("demo-x"))
        .await;

    assert_eq!(report.results[0].outcome, Outcome::Deleted);
    assert_eq!(provider.delete_count("stack:demo-x"), 2);
}

/// Polling that never reaches a terminal status times out and marks the
/// resource failed, driving a failing exit verdict.
#[tokio::test]
async fn poll_timeout_marks_resource_failed() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_status(
        "stack:demo-slow",
        vec![LifecycleStatus::Active, LifecycleStatus::DeleteInProgress],
    );

    let config = RunConfig {
        max_poll: Duration::from_secs(30),
        poll_interval: Duration::from_secs(15),
        max_verification_attempts: 1,
        ..RunConfig::default()
    };
    let report = coordinator(&provider, config)
        .run(&single_stack("demo-slow"))
        .await;

    let result = &report.results[0];
    assert_eq!(result.outcome, Outcome::Failed);
    assert_eq!(result.last_status, Some(LifecycleStatus::DeleteInProgress));
    assert!(!report.is_success());
}

/// A cancelled run never starts work on further resources.
#[tokio::test]
async fn cancellation_stops_before_next_resource() {
    let provider = Arc::new(MockControlPlane::new());
    let cancel = CancelToken::new();
    cancel.cancel();

    let coordinator = Coordinator::new(
        provider.clone(),
        Arc::new(InstantClock::new()),
        RunConfig::default(),
        cancel,
    );
    let report = coordinator
        .run(&Registry::layered("demo", &["api".to_string()]))
        .await;

    assert!(report.results.is_empty());
    assert!(provider.events().is_empty());
}

/// Cancellation arriving mid-sweep stops at the next pattern boundary:
/// remaining patterns are never even enumerated.
#[tokio::test]
async fn cancellation_stops_sweep_before_next_pattern() {
    let provider = Arc::new(MockControlPlane::new());
    provider.script_list(SweepKind::LogGroup, "/ecs/demo-", vec!["/ecs/demo-api"]);
    provider.script_status(
        "log-group:/ecs/demo-api",
        vec![LifecycleStatus::Active, LifecycleStatus::DeleteInProgress],
    );
    provider.script_list(SweepKind::Parameter, "/demo/", vec!["/demo/db-url"]);

    let mut registry = Registry::new();
    registry.add_sweep(SweepEntry::new(SweepKind::LogGroup, "/ecs/demo-"));
    registry.add_sweep(SweepEntry::new(SweepKind::Parameter, "/demo/"));

    // The first poll sleep flips the token, as a signal handler would.
    let cancel = CancelToken::new();
    let coordinator = Coordinator::new(
        provider.clone(),
        Arc::new(CancellingClock::new(cancel.clone())),
        RunConfig::default(),
        cancel,
    );
    let report = coordinator.run(&registry).await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Failed);
    let events = provider.events();
    assert!(events.iter().any(|e| e == "list:log-group:/ecs/demo-"));
    assert!(!events.iter().any(|e| e.starts_with("list:parameter:")));
}
