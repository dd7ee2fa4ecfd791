// src/engine/pool.rs

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, warn};

use crate::dag::{Dag, Scheduler, validate_job_set};
use crate::errors::{Error, Result, RunError, WorkdagError};
use crate::exec::JobRef;
use crate::result::DagResult;
use crate::types::JobName;

/// How long in-flight jobs get to exit after a failure, timeout or
/// cancellation before they are abandoned.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type Completion = (JobName, std::result::Result<bool, Error>);

/// Why the main loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    /// Nothing is running and nothing more can be dispatched.
    Drained,
    /// A job returned an error.
    Failed,
    TimedOut,
    Cancelled,
}

/// Executes a job DAG with bounded concurrency and a global deadline.
///
/// This is the async IO shell around [`Scheduler`], which holds all of the
/// scheduling semantics. The pool:
/// - hands ready jobs to Tokio tasks, at most `concurrency` at a time
/// - feeds every completion back into the scheduler from a single loop,
///   so job statuses and dependency counters are only touched in one place
/// - cancels the run-scoped token on the first failure, on timeout, and
///   when the caller's token is cancelled
///
/// [`WorkerPool::start`] never fails: every outcome, including timeouts,
/// ends up in the returned [`DagResult`].
pub struct WorkerPool {
    concurrency: usize,
    jobs: BTreeMap<JobName, JobRef>,
    dag: Dag,
    timeout: Duration,
    shutdown_grace: Duration,
    span: Span,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("concurrency", &self.concurrency)
            .field("jobs", &self.jobs.keys().collect::<Vec<_>>())
            .field("dag", &self.dag)
            .field("timeout", &self.timeout)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Validate the inputs and build a pool.
    ///
    /// Fails if `concurrency` is zero, if job names and DAG keys differ (or
    /// a name is duplicated), if an edge points at an unknown job, or if the
    /// DAG has a cycle.
    pub fn new<I>(concurrency: usize, jobs: I, dag: Dag, timeout: Duration) -> Result<Self>
    where
        I: IntoIterator<Item = JobRef>,
    {
        if concurrency < 1 {
            return Err(WorkdagError::InvalidConcurrency(concurrency));
        }

        let jobs: Vec<JobRef> = jobs.into_iter().collect();
        validate_job_set(jobs.iter().map(|job| job.name()), &dag)?;

        let jobs = jobs
            .into_iter()
            .map(|job| (job.name().to_string(), job))
            .collect();

        Ok(Self {
            concurrency,
            jobs,
            dag,
            timeout,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            span: Span::none(),
        })
    }

    /// Override how long in-flight jobs may take to exit after the run is
    /// cut short.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Span every run (and every job) is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Run the DAG to completion, failure or timeout.
    pub async fn start(&self) -> DagResult {
        self.start_with_cancel(&CancellationToken::new()).await
    }

    /// Like [`WorkerPool::start`], bounded additionally by `parent`.
    ///
    /// Cancelling `parent` ends the run the same way a timeout does, except
    /// the sentinel entry says the run was cancelled.
    pub async fn start_with_cancel(&self, parent: &CancellationToken) -> DagResult {
        let span = self.span.clone();
        self.run(parent).instrument(span).await
    }

    async fn run(&self, parent: &CancellationToken) -> DagResult {
        let started = Instant::now();
        let run_token = parent.child_token();
        let mut scheduler = Scheduler::new(self.dag.clone());

        if parent.is_cancelled() {
            warn!("worker pool: caller cancelled before the run started");
            let mut result = scheduler.into_result();
            result.record_cancelled();
            return result;
        }

        info!(
            jobs = self.dag.len(),
            concurrency = self.concurrency,
            timeout = ?self.timeout,
            "worker pool: run started"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut queue: VecDeque<JobName> = scheduler.start().newly_ready.into();
        let mut in_flight: JoinSet<Completion> = JoinSet::new();

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        let end = loop {
            if !scheduler.is_halted() {
                self.dispatch(&mut queue, &semaphore, &mut in_flight, &run_token);
            }

            if in_flight.is_empty() {
                break RunEnd::Drained;
            }

            tokio::select! {
                biased;
                _ = parent.cancelled() => break RunEnd::Cancelled,
                _ = &mut deadline => break RunEnd::TimedOut,
                joined = in_flight.join_next() => {
                    let (job, outcome) = match joined {
                        Some(Ok(completion)) => completion,
                        Some(Err(err)) => {
                            error!(error = %err, "worker pool: job task ended abnormally");
                            continue;
                        }
                        None => continue,
                    };

                    let step = scheduler.complete(&job, outcome);
                    if step.failed.is_some() {
                        if !queue.is_empty() {
                            debug!(dropped = ?queue, "dropping queued jobs after failure");
                        }
                        break RunEnd::Failed;
                    }
                    queue.extend(step.newly_ready);
                }
            }
        };

        // Everything past this point only shuts down: no job is dispatched.
        scheduler.halt();
        run_token.cancel();

        match end {
            RunEnd::Drained => {}
            // Siblings of a failed job still report, within the grace period.
            RunEnd::Failed => self.drain(&mut in_flight, Some(&mut scheduler)).await,
            RunEnd::TimedOut | RunEnd::Cancelled => self.drain(&mut in_flight, None).await,
        }

        let mut result = scheduler.into_result();
        match end {
            RunEnd::Drained | RunEnd::Failed => {}
            RunEnd::TimedOut => {
                warn!(timeout = ?self.timeout, "worker pool: run timed out");
                result.record_timeout(self.timeout);
            }
            RunEnd::Cancelled => {
                warn!("worker pool: run cancelled by caller");
                result.record_cancelled();
            }
        }

        info!(
            elapsed = ?started.elapsed(),
            ready = result.is_ready(),
            failed = result.is_failed(),
            timed_out = result.is_timeouted(),
            "worker pool: run finished"
        );

        result
    }

    /// Start queued jobs while pool slots are free.
    fn dispatch(
        &self,
        queue: &mut VecDeque<JobName>,
        semaphore: &Arc<Semaphore>,
        in_flight: &mut JoinSet<Completion>,
        run_token: &CancellationToken,
    ) {
        while !queue.is_empty() {
            let Ok(permit) = Arc::clone(semaphore).try_acquire_owned() else {
                debug!(queued = queue.len(), "worker pool: all slots busy");
                break;
            };
            let Some(name) = queue.pop_front() else {
                break;
            };
            let Some(job) = self.jobs.get(&name).cloned() else {
                error!(job = %name, "worker pool: no implementation for scheduled job");
                continue;
            };

            info!(job = %name, "dispatching job");
            let token = run_token.clone();

            in_flight.spawn(
                async move {
                    let outcome = AssertUnwindSafe(job.run(token)).catch_unwind().await;
                    drop(permit);

                    let outcome = match outcome {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            error!(job = %name, "job panicked");
                            Err(RunError::JobPanicked(name.clone()).into())
                        }
                    };
                    (name, outcome)
                }
                .in_current_span(),
            );
        }
    }

    /// Give cancelled jobs the grace period to return, then abort the rest.
    ///
    /// Outcomes that arrive in time are fed to `record` when given and
    /// discarded otherwise.
    async fn drain(&self, in_flight: &mut JoinSet<Completion>, mut record: Option<&mut Scheduler>) {
        if in_flight.is_empty() {
            return;
        }

        debug!(
            in_flight = in_flight.len(),
            grace = ?self.shutdown_grace,
            "waiting for in-flight jobs to observe cancellation"
        );

        let drained = tokio::time::timeout(self.shutdown_grace, async {
            while let Some(joined) = in_flight.join_next().await {
                if let (Ok((job, outcome)), Some(scheduler)) = (joined, record.as_deref_mut()) {
                    scheduler.complete(&job, outcome);
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                abandoned = in_flight.len(),
                "in-flight jobs ignored cancellation; aborting them"
            );
            in_flight.abort_all();
        }
    }
}
