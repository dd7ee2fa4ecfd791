// src/errors.rs

//! Crate-wide error types.
//!
//! - [`WorkdagError`] covers configuration-class failures that are reported
//!   before any job runs.
//! - [`RunError`] describes run-level outcomes that are recorded *inside* a
//!   `DagResult` rather than returned.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid concurrency limit {0}: must be >= 1")]
    InvalidConcurrency(usize),

    #[error("Duplicate job name: {0}")]
    DuplicateJob(String),

    #[error("Job set does not match DAG: {0}")]
    JobSetMismatch(String),

    #[error("Job '{job}' has unknown dependency '{dependency}'")]
    UnknownDependency { job: String, dependency: String },

    #[error("Job name '{0}' is reserved")]
    ReservedJobName(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Run-level errors stored under the sentinel entry of a `DagResult`, or
/// attached to a job that never produced an outcome of its own.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("timeout after {}", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("run cancelled by caller")]
    Cancelled,

    #[error("job '{0}' panicked")]
    JobPanicked(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WorkdagError>;
