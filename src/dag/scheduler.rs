use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::graph::Dag;
use crate::dag::scheduler_step::SchedulerStep;
use crate::errors::Error;
use crate::result::DagResult;
use crate::types::{JobName, JobStatus};

/// Per-run scheduling state machine.
///
/// Holds the immutable DAG plus everything that changes while a run is
/// active:
/// - a live counter of unmet dependencies per job
/// - the set of jobs handed out for execution and not yet completed
/// - the `DagResult` being filled in
///
/// It is synchronous and performs no IO. The worker pool owns exactly one
/// `Scheduler` per run and feeds it completions one at a time, which makes
/// it the single point where job statuses change.
#[derive(Debug)]
pub struct Scheduler {
    dag: Dag,
    successors: Dag,
    pending_deps: HashMap<JobName, usize>,
    scheduled: HashSet<JobName>,
    result: DagResult,
    started: bool,
    halted: bool,
}

impl Scheduler {
    /// Build a scheduler for a validated DAG.
    pub fn new(dag: Dag) -> Self {
        let successors = dag.reverse();
        let pending_deps = dag
            .jobs()
            .map(|job| (job.to_string(), dag.dependencies_of(job).len()))
            .collect();
        let result = DagResult::new(&dag);

        Self {
            dag,
            successors,
            pending_deps,
            scheduled: HashSet::new(),
            result,
            started: false,
            halted: false,
        }
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Read-only view of the results recorded so far.
    pub fn result(&self) -> &DagResult {
        &self.result
    }

    /// Hand the results over once the run is over.
    pub fn into_result(self) -> DagResult {
        self.result
    }

    pub fn status_of(&self, job: &str) -> Option<JobStatus> {
        self.result.get(job).map(|r| r.status)
    }

    /// Live count of dependencies of `job` that have not yet succeeded.
    pub fn pending_dependencies(&self, job: &str) -> Option<usize> {
        self.pending_deps.get(job).copied()
    }

    /// Number of jobs handed out and not yet completed.
    pub fn in_flight(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether every job has reached a terminal status.
    pub fn is_complete(&self) -> bool {
        self.result.jobs().all(|r| r.status.is_terminal())
    }

    /// Stop handing out new jobs. Completions of jobs that are already
    /// running are still recorded.
    pub fn halt(&mut self) {
        if !self.halted {
            debug!(in_flight = self.scheduled.len(), "scheduler: halting run");
        }
        self.halted = true;
    }

    /// Begin the run: every job without dependencies becomes ready.
    pub fn start(&mut self) -> SchedulerStep {
        if self.started {
            warn!("scheduler: start called twice; ignoring");
            return SchedulerStep::empty();
        }
        self.started = true;

        let mut newly_ready: Vec<JobName> = self
            .pending_deps
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(job, _)| job.clone())
            .collect();
        newly_ready.sort();
        self.scheduled.extend(newly_ready.iter().cloned());

        info!(jobs = self.dag.len(), roots = ?newly_ready, "scheduler: starting run");

        SchedulerStep {
            newly_ready,
            run_just_finished: self.is_complete(),
            ..SchedulerStep::empty()
        }
    }

    /// Record the outcome of a job that was handed out by this scheduler.
    ///
    /// - `Err(_)`: the job is `Failed` and the run halts; successors are left
    ///   untouched.
    /// - `Ok(false)`: the job is `InProgress` and its whole downstream
    ///   subtree is `Skipped` (unless the run is already halted).
    /// - `Ok(true)`: the job is `Success` and each direct successor's counter
    ///   is decremented; those reaching zero become ready.
    ///
    /// Completions for jobs that are not currently scheduled are ignored, so
    /// a job's status changes at most once.
    pub fn complete(&mut self, job: &str, outcome: Result<bool, Error>) -> SchedulerStep {
        if !self.scheduled.remove(job) {
            warn!(job = %job, "scheduler: completion for job that is not running; ignoring");
            return SchedulerStep::empty();
        }

        let mut step = match outcome {
            Err(err) => self.record_failure(job, err),
            Ok(false) => self.record_not_ready(job),
            Ok(true) => self.record_success(job),
        };
        step.run_just_finished = self.is_complete();
        step
    }

    fn record_failure(&mut self, job: &str, err: Error) -> SchedulerStep {
        warn!(job = %job, error = %err, "job failed; halting run");
        if let Some(entry) = self.result.get_mut(job) {
            entry.fail(err);
        }
        self.halt();

        SchedulerStep {
            failed: Some(job.to_string()),
            ..SchedulerStep::empty()
        }
    }

    fn record_not_ready(&mut self, job: &str) -> SchedulerStep {
        if let Some(entry) = self.result.get_mut(job) {
            entry.not_ready();
        }

        // A halted run leaves everything it never reached as `Unknown`.
        if self.halted {
            info!(job = %job, "job not ready after run was halted; leaving successors untouched");
            return SchedulerStep::empty();
        }

        let mut newly_skipped = Vec::new();
        for name in self.successors.subtree(job) {
            if name == job {
                continue;
            }
            if self.scheduled.contains(&name) {
                warn!(job = %name, "successor of a not-ready job is already running; not skipping");
                continue;
            }
            if let Some(entry) = self.result.get_mut(&name) {
                // Skip wins over partial readiness: counters are not consulted.
                if entry.is_unknown() {
                    entry.skip();
                    newly_skipped.push(name);
                }
            }
        }

        info!(job = %job, skipped = ?newly_skipped, "job not ready; skipping downstream jobs");

        SchedulerStep {
            newly_skipped,
            ..SchedulerStep::empty()
        }
    }

    fn record_success(&mut self, job: &str) -> SchedulerStep {
        if let Some(entry) = self.result.get_mut(job) {
            entry.success();
        }
        debug!(job = %job, "job succeeded");

        let mut newly_ready = Vec::new();
        for succ in self.successors.dependencies_of(job) {
            let Some(count) = self.pending_deps.get_mut(succ) else {
                continue;
            };
            *count = count.saturating_sub(1);
            debug!(job = %succ, remaining = *count, "decremented dependency counter");

            if *count > 0 || self.halted {
                continue;
            }
            if self.result.status_of(succ) != JobStatus::Unknown {
                continue;
            }
            if self.scheduled.insert(succ.clone()) {
                newly_ready.push(succ.clone());
            }
        }
        newly_ready.sort();

        SchedulerStep {
            newly_ready,
            ..SchedulerStep::empty()
        }
    }
}
