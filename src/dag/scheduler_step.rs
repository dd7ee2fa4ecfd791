// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::types::JobName;

/// Structured result of a single scheduler transition.
///
/// The worker pool only needs `newly_ready`; the other fields exist so tests
/// and logs can see exactly what one completion changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Jobs whose dependencies all succeeded as a result of this step, sorted.
    /// The caller is expected to dispatch them.
    pub newly_ready: Vec<JobName>,
    /// Jobs marked `Skipped` by this step, sorted.
    pub newly_skipped: Vec<JobName>,
    /// The job that failed in this step, if any. Once set, the run is halted.
    pub failed: Option<JobName>,
    /// Whether every job is now in a terminal state.
    pub run_just_finished: bool,
}

impl SchedulerStep {
    pub(crate) fn empty() -> Self {
        Self::default()
    }
}
