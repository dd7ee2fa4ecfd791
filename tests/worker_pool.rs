// tests/worker_pool.rs

mod common;
use crate::common::{Script, ScriptedJob, as_job_refs, diamond_dag, init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use workdag::engine::WorkerPool;
use workdag::errors::WorkdagError;
use workdag::exec::{Job, JobRef, job_fn};
use workdag::report;
use workdag::types::{JobStatus, RunOutcome};
use workdag_test_utils::dag_from;

const MINUTE: Duration = Duration::from_secs(60);

/// Diamond-DAG jobs, all ready except for the overrides.
fn diamond_jobs(overrides: Vec<Arc<ScriptedJob>>) -> Vec<Arc<ScriptedJob>> {
    ["A", "B", "C", "D", "E"]
        .into_iter()
        .map(|name| {
            overrides
                .iter()
                .find(|job| job.name() == name)
                .cloned()
                .unwrap_or_else(|| ScriptedJob::ready(name))
        })
        .collect()
}

fn invoked(jobs: &[Arc<ScriptedJob>], name: &str) -> usize {
    jobs.iter()
        .find(|job| job.name() == name)
        .map(|job| job.invocations())
        .unwrap_or(0)
}

#[tokio::test]
async fn all_ready_jobs_make_the_run_ready() {
    init_tracing();
    let jobs = diamond_jobs(vec![]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), MINUTE).unwrap();

    let result = with_timeout(pool.start()).await;

    assert!(result.is_ready());
    assert!(result.is_successful());
    assert!(!result.is_timeouted());
    assert!(result.jobs().all(|r| r.status == JobStatus::Success));
    for name in ["A", "B", "C", "D", "E"] {
        assert_eq!(invoked(&jobs, name), 1, "{name} should run exactly once");
    }
}

#[tokio::test]
async fn not_ready_job_skips_its_downstream() {
    init_tracing();
    let jobs = diamond_jobs(vec![ScriptedJob::not_ready("B")]);
    let dag = diamond_dag();
    let pool = WorkerPool::new(4, as_job_refs(&jobs), dag.clone(), MINUTE).unwrap();

    let result = with_timeout(pool.start()).await;

    assert_eq!(result.status_of("A"), JobStatus::Success);
    assert_eq!(result.status_of("B"), JobStatus::InProgress);
    assert_eq!(result.status_of("C"), JobStatus::Success);
    assert_eq!(result.status_of("D"), JobStatus::Skipped);
    assert_eq!(result.status_of("E"), JobStatus::Skipped);
    assert!(!result.is_ready());
    assert!(!result.is_failed());

    // Skipped jobs are never invoked.
    assert_eq!(invoked(&jobs, "D"), 0);
    assert_eq!(invoked(&jobs, "E"), 0);

    let frontiers = result.frontiers(&dag);
    assert_eq!(frontiers.jobs(), vec!["B"]);
    assert!(frontiers[0].blocked_by.is_empty());

    assert_eq!(result.boundary_subtrees(&dag), vec!["A".to_string(), "C".to_string()]);
}

#[tokio::test]
async fn failing_job_cancels_the_run() {
    init_tracing();
    let jobs = diamond_jobs(vec![ScriptedJob::failing("C", "boom")]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), MINUTE).unwrap();

    let result = with_timeout(pool.start()).await;

    assert_eq!(result.status_of("C"), JobStatus::Failed);
    assert_eq!(result.status_of("D"), JobStatus::Unknown);
    assert_eq!(result.status_of("E"), JobStatus::Unknown);
    assert!(result.is_failed());
    assert!(!result.is_timeouted());
    assert_eq!(
        result.first_error().map(|e| e.to_string()).as_deref(),
        Some("boom")
    );
    assert_eq!(invoked(&jobs, "D"), 0);
    assert_eq!(invoked(&jobs, "E"), 0);
}

#[tokio::test]
async fn failure_signals_cancellation_to_running_siblings() {
    init_tracing();
    let jobs = diamond_jobs(vec![
        ScriptedJob::new("B", Script::HangUntilCancelled).shared(),
        ScriptedJob::new("C", Script::Fail("boom".into()))
            .with_delay(Duration::from_millis(20))
            .shared(),
    ]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), MINUTE).unwrap();

    let result = with_timeout(pool.start()).await;

    // B observed cancellation and reported "not ready"; the halted run skips nothing.
    assert_eq!(result.status_of("B"), JobStatus::InProgress);
    assert_eq!(result.status_of("C"), JobStatus::Failed);
    assert_eq!(result.status_of("D"), JobStatus::Unknown);
    assert_eq!(result.status_of("E"), JobStatus::Unknown);
}

#[tokio::test]
async fn failure_does_not_wait_for_stubborn_siblings() {
    init_tracing();
    let jobs = diamond_jobs(vec![
        ScriptedJob::new("B", Script::Stubborn(Duration::from_secs(30))).shared(),
        ScriptedJob::failing("C", "boom"),
    ]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), MINUTE)
        .unwrap()
        .with_shutdown_grace(Duration::from_millis(20));

    let started = std::time::Instant::now();
    let result = with_timeout(pool.start()).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(result.status_of("C"), JobStatus::Failed);
    assert_eq!(result.status_of("B"), JobStatus::Unknown);
    assert!(result.is_failed());
    assert!(!result.is_timeouted());
    assert_eq!(report::outcome_of(&result), RunOutcome::Failed);
}

#[tokio::test]
async fn global_timeout_records_sentinel() {
    init_tracing();
    let jobs = diamond_jobs(vec![ScriptedJob::new("A", Script::HangUntilCancelled).shared()]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), Duration::from_millis(30))
        .unwrap();

    let result = with_timeout(pool.start()).await;

    assert!(result.is_timeouted());
    assert!(result.is_failed());
    assert!(!result.is_successful());
    let sentinel = result.timeout_error().expect("sentinel entry");
    assert_eq!(sentinel.status, JobStatus::Failed);
    let msg = sentinel.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
    assert!(msg.starts_with("timeout after"), "{msg}");

    for name in ["B", "C", "D", "E"] {
        assert_eq!(result.status_of(name), JobStatus::Unknown);
        assert_eq!(invoked(&jobs, name), 0);
    }
}

#[tokio::test]
async fn job_ignoring_cancellation_is_abandoned_after_grace() {
    init_tracing();
    let jobs = vec![ScriptedJob::new("slow", Script::Stubborn(Duration::from_secs(30))).shared()];
    let pool = WorkerPool::new(
        1,
        as_job_refs(&jobs),
        dag_from(&[("slow", &[])]),
        Duration::from_millis(20),
    )
    .unwrap()
    .with_shutdown_grace(Duration::from_millis(20));

    let result = with_timeout(pool.start()).await;

    assert!(result.is_timeouted());
    assert_eq!(result.status_of("slow"), JobStatus::Unknown);
}

#[tokio::test]
async fn caller_cancellation_is_a_timeout_class_end() {
    init_tracing();
    let jobs = diamond_jobs(vec![ScriptedJob::new("A", Script::HangUntilCancelled).shared()]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), MINUTE).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = with_timeout(pool.start_with_cancel(&cancel)).await;

    assert!(result.is_timeouted());
    let msg = result
        .timeout_error()
        .and_then(|r| r.error.as_ref())
        .map(|e| e.to_string());
    assert_eq!(msg.as_deref(), Some("run cancelled by caller"));
}

#[tokio::test]
async fn already_cancelled_caller_runs_nothing() {
    init_tracing();
    let jobs = diamond_jobs(vec![]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), MINUTE).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = pool.start_with_cancel(&cancel).await;

    assert!(result.is_timeouted());
    assert!(jobs.iter().all(|job| job.invocations() == 0));
    assert!(result.jobs().all(|r| r.is_unknown()));
}

#[tokio::test]
async fn panicking_job_is_recorded_as_failure() {
    init_tracing();
    let jobs = diamond_jobs(vec![ScriptedJob::new("B", Script::Panic).shared()]);
    let pool = WorkerPool::new(4, as_job_refs(&jobs), diamond_dag(), MINUTE).unwrap();

    let result = with_timeout(pool.start()).await;

    assert_eq!(result.status_of("B"), JobStatus::Failed);
    assert_eq!(result.status_of("D"), JobStatus::Unknown);
    let msg = result.get("B").and_then(|r| r.error.as_ref()).map(|e| e.to_string());
    assert_eq!(msg.as_deref(), Some("job 'B' panicked"));
}

#[tokio::test]
async fn closure_jobs_run_through_the_pool() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let jobs: Vec<JobRef> = ["x", "y"]
        .into_iter()
        .map(|name| {
            let calls = Arc::clone(&calls);
            job_fn(name, move |_cancel| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                }
            })
        })
        .collect();

    let pool = WorkerPool::new(1, jobs, dag_from(&[("x", &[]), ("y", &["x"])]), MINUTE).unwrap();
    let result = with_timeout(pool.start()).await;

    assert!(result.is_ready());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn zero_concurrency_is_rejected() {
    let jobs = diamond_jobs(vec![]);
    let err = WorkerPool::new(0, as_job_refs(&jobs), diamond_dag(), MINUTE).unwrap_err();
    assert!(matches!(err, WorkdagError::InvalidConcurrency(0)));
}

#[test]
fn job_set_must_match_dag_keys() {
    let missing = vec![ScriptedJob::ready("A")];
    let err = WorkerPool::new(1, as_job_refs(&missing), diamond_dag(), MINUTE).unwrap_err();
    assert!(matches!(err, WorkdagError::JobSetMismatch(_)), "{err:?}");

    let extra = diamond_jobs(vec![]);
    let mut extra = as_job_refs(&extra);
    extra.push(ScriptedJob::ready("F") as JobRef);
    let err = WorkerPool::new(1, extra, diamond_dag(), MINUTE).unwrap_err();
    assert!(matches!(err, WorkdagError::JobSetMismatch(_)), "{err:?}");
}

#[test]
fn duplicate_job_names_are_rejected() {
    let jobs = vec![ScriptedJob::ready("A"), ScriptedJob::ready("A")];
    let err = WorkerPool::new(1, as_job_refs(&jobs), dag_from(&[("A", &[])]), MINUTE).unwrap_err();
    assert!(matches!(err, WorkdagError::DuplicateJob(name) if name == "A"));
}

#[test]
fn invalid_graphs_are_rejected_before_running() {
    let jobs = vec![ScriptedJob::ready("a"), ScriptedJob::ready("b")];

    let cyclic = dag_from(&[("a", &["b"]), ("b", &["a"])]);
    let err = WorkerPool::new(1, as_job_refs(&jobs), cyclic, MINUTE).unwrap_err();
    assert!(matches!(err, WorkdagError::DagCycle(_)), "{err:?}");

    let dangling = dag_from(&[("a", &[]), ("b", &["zzz"])]);
    let err = WorkerPool::new(1, as_job_refs(&jobs), dangling, MINUTE).unwrap_err();
    assert!(matches!(err, WorkdagError::UnknownDependency { .. }), "{err:?}");
}
