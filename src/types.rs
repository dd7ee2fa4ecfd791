// src/types.rs

//! Small shared types used across the DAG, result and engine layers.

use std::fmt;

/// Canonical job name type used throughout the crate.
pub type JobName = String;

/// Outcome of a single job within one DAG run.
///
/// - `Unknown`: initial state; the job was never scheduled (or the run ended
///   before it was reached).
/// - `Success`: the job ran and reported ready.
/// - `InProgress`: the job ran without error but reported "not yet ready".
///   This is terminal for the run; the engine never re-polls it.
/// - `Skipped`: the job was never run because an ancestor was `InProgress`.
/// - `Failed`: the job ran and returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Unknown,
    Success,
    InProgress,
    Skipped,
    Failed,
}

impl JobStatus {
    /// Whether the engine will never touch a job in this state again.
    ///
    /// `Unknown` is only "terminal" when the run itself has ended, which the
    /// status alone cannot express, so it reports `false`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Unknown => "unknown",
            JobStatus::Success => "success",
            JobStatus::InProgress => "in_progress",
            JobStatus::Skipped => "skipped",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a finished run, used for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job succeeded.
    Ready,
    /// Nothing failed, but some jobs are still in progress (or skipped).
    NotReady,
    /// At least one job failed.
    Failed,
    /// The global deadline elapsed or the run was cancelled.
    TimedOut,
    /// `--dry-run`: nothing was executed.
    DryRun,
}

impl RunOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Ready | RunOutcome::DryRun => 0,
            RunOutcome::NotReady => 2,
            RunOutcome::Failed | RunOutcome::TimedOut => 1,
        }
    }
}
