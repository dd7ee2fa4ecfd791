// src/result/dag_result.rs

use std::collections::BTreeMap;
use std::time::Duration;

use crate::dag::Dag;
use crate::errors::{Error, RunError};
use crate::result::JobResult;
use crate::types::{JobName, JobStatus};

/// Reserved result key for the run-level timeout entry.
///
/// No job may use this name; `Dag::validate` rejects it.
pub const TIMEOUT_ERROR_KEY: &str = "timeout_error";

/// Per-job results of one DAG run.
///
/// Covers every job of the DAG the run was started with and, if the run hit
/// its deadline (or was cancelled by the caller), one extra entry under
/// [`TIMEOUT_ERROR_KEY`].
///
/// Only the scheduler writes to a `DagResult` while a run is active; once
/// returned it belongs to the caller.
#[derive(Debug, Default)]
pub struct DagResult {
    results: BTreeMap<JobName, JobResult>,
}

impl DagResult {
    /// One `Unknown` entry per job of `dag`.
    pub fn new(dag: &Dag) -> Self {
        let results = dag
            .jobs()
            .map(|job| (job.to_string(), JobResult::new(job)))
            .collect();
        Self { results }
    }

    pub fn timeout_error_key() -> &'static str {
        TIMEOUT_ERROR_KEY
    }

    pub fn get(&self, job: &str) -> Option<&JobResult> {
        self.results.get(job)
    }

    pub fn get_mut(&mut self, job: &str) -> Option<&mut JobResult> {
        self.results.get_mut(job)
    }

    /// Status of `job`, treating names absent from the map as `Unknown`.
    pub fn status_of(&self, job: &str) -> JobStatus {
        self.results
            .get(job)
            .map(|r| r.status)
            .unwrap_or(JobStatus::Unknown)
    }

    pub fn contains(&self, job: &str) -> bool {
        self.results.contains_key(job)
    }

    /// Number of entries, including the sentinel entry if present.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// All entries in name order, including the sentinel entry.
    pub fn iter(&self) -> impl Iterator<Item = &JobResult> {
        self.results.values()
    }

    /// Job entries in name order, excluding the sentinel entry.
    pub fn jobs(&self) -> impl Iterator<Item = &JobResult> {
        self.results
            .iter()
            .filter(|(key, _)| key.as_str() != TIMEOUT_ERROR_KEY)
            .map(|(_, result)| result)
    }

    /// Sorted keys, including the sentinel entry.
    pub fn ordered_jobs(&self) -> Vec<&str> {
        self.results.keys().map(|k| k.as_str()).collect()
    }

    /// Record that the run hit its global deadline.
    pub fn record_timeout(&mut self, deadline: Duration) {
        self.record_run_error(RunError::Timeout(deadline));
    }

    /// Record that the caller cancelled the run; treated like a timeout.
    pub fn record_cancelled(&mut self) {
        self.record_run_error(RunError::Cancelled);
    }

    fn record_run_error(&mut self, err: RunError) {
        let mut entry = JobResult::new(TIMEOUT_ERROR_KEY);
        entry.fail(err);
        self.results.insert(TIMEOUT_ERROR_KEY.to_string(), entry);
    }

    /// The sentinel entry, if the run ended on its deadline or was cancelled.
    pub fn timeout_error(&self) -> Option<&JobResult> {
        self.results.get(TIMEOUT_ERROR_KEY)
    }

    pub fn is_timeouted(&self) -> bool {
        self.results.contains_key(TIMEOUT_ERROR_KEY)
    }

    /// Any entry is `Failed`, the sentinel entry included.
    pub fn is_failed(&self) -> bool {
        self.results.values().any(JobResult::is_failed)
    }

    /// Every job (sentinel excluded) is `Success`.
    pub fn is_ready(&self) -> bool {
        self.jobs().all(JobResult::is_successful)
    }

    pub fn is_not_ready(&self) -> bool {
        !self.is_ready()
    }

    /// Every entry, the sentinel included, is `Success`.
    ///
    /// Unlike [`DagResult::is_ready`] this is false for any timed-out run.
    pub fn is_successful(&self) -> bool {
        self.results.values().all(JobResult::is_successful)
    }

    pub fn is_not_successful(&self) -> bool {
        !self.is_successful()
    }

    /// First error found, scanning entries in name order.
    pub fn first_error(&self) -> Option<&Error> {
        self.results.values().find_map(|r| r.error.as_ref())
    }

    /// First `InProgress` job in name order: the most informative single
    /// point the run is waiting on.
    pub fn first_in_progress(&self) -> Option<&JobResult> {
        self.results.values().find(|r| r.is_in_progress())
    }

    pub(crate) fn is_success(&self, job: &str) -> bool {
        self.status_of(job) == JobStatus::Success
    }
}
