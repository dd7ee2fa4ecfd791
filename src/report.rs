// src/report.rs

//! Plain-text rendering of a finished run for the `workdag` binary.

use std::fmt::Write;

use crate::dag::Dag;
use crate::result::DagResult;
use crate::store::Store;
use crate::types::{JobName, RunOutcome};

/// Classify a finished run for the process exit code.
pub fn outcome_of(result: &DagResult) -> RunOutcome {
    if result.is_timeouted() {
        RunOutcome::TimedOut
    } else if result.is_failed() {
        RunOutcome::Failed
    } else if result.is_ready() {
        RunOutcome::Ready
    } else {
        RunOutcome::NotReady
    }
}

/// Human-readable summary: per-job status, frontier, boundary, first
/// in-progress job and first error.
pub fn render(result: &DagResult, dag: &Dag, outputs: &Store<JobName, String>) -> String {
    let mut out = String::new();
    let width = dag.jobs().map(str::len).max().unwrap_or(0);

    let _ = writeln!(out, "workdag result: {:?}", outcome_of(result));

    for entry in result.jobs() {
        let _ = write!(out, "  {:<width$}  {}", entry.name, entry.status, width = width);
        if let Some(err) = &entry.error {
            let _ = write!(out, "  ({err})");
        }
        if let Some(last) = outputs.get(entry.name.as_str()) {
            let _ = write!(out, "  > {last}");
        }
        out.push('\n');
    }

    if let Some(timeout) = result.timeout_error() {
        if let Some(err) = &timeout.error {
            let _ = writeln!(out, "  run: {err}");
        }
    }

    let frontiers = result.frontiers(dag);
    if !frontiers.is_empty() {
        let _ = writeln!(out, "frontier:");
        for item in &frontiers {
            let _ = writeln!(
                out,
                "  - {} ({}) blocked_by={:?} subtree={:?}",
                item.job, item.status, item.blocked_by, item.subtree
            );
        }
    }

    let boundary = result.boundary_subtrees(dag);
    if !boundary.is_empty() {
        let _ = writeln!(out, "boundary: {:?}", boundary);
    }

    if let Some(job) = result.first_in_progress() {
        let _ = writeln!(out, "first in progress: {}", job.name);
    }
    if let Some(err) = result.first_error() {
        let _ = writeln!(out, "first error: {err}");
    }

    out
}
