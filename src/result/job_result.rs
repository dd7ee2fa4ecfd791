// src/result/job_result.rs

use crate::errors::Error;
use crate::types::{JobName, JobStatus};

/// Outcome record for one job.
///
/// Created with `Unknown` status when a run starts and transitioned at most
/// once by the scheduler.
#[derive(Debug)]
pub struct JobResult {
    pub name: JobName,
    pub status: JobStatus,
    pub error: Option<Error>,
}

impl JobResult {
    pub fn new(name: impl Into<JobName>) -> Self {
        Self {
            name: name.into(),
            status: JobStatus::Unknown,
            error: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }

    pub fn is_skipped(&self) -> bool {
        self.status == JobStatus::Skipped
    }

    pub fn is_not_skipped(&self) -> bool {
        !self.is_skipped()
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == JobStatus::InProgress
    }

    pub fn is_successful(&self) -> bool {
        self.status == JobStatus::Success
    }

    pub fn is_unknown(&self) -> bool {
        self.status == JobStatus::Unknown
    }

    pub fn skip(&mut self) {
        self.status = JobStatus::Skipped;
    }

    pub fn success(&mut self) {
        self.status = JobStatus::Success;
    }

    pub fn fail(&mut self, err: impl Into<Error>) {
        self.status = JobStatus::Failed;
        self.error = Some(err.into());
    }

    pub fn not_ready(&mut self) {
        self.status = JobStatus::InProgress;
    }
}
