// src/exec/mod.rs

//! Job implementations.
//!
//! - [`job`] defines the [`Job`] trait the worker pool schedules, plus the
//!   closure-backed [`FnJob`].
//! - [`command`] provides [`CommandJob`], which runs a shell command via
//!   `tokio::process::Command` and is what the `workdag` binary uses.

pub mod command;
pub mod job;

pub use command::{CommandJob, jobs_from_config};
pub use job::{FnJob, Job, JobFuture, JobRef, job_fn};
