// src/dag/mod.rs

//! DAG representation and scheduling.
//!
//! - [`graph`] holds the dependency graph and its pure traversals.
//! - [`validate`] checks a graph (and a job set) before a run.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   jobs are ready, and how outcomes propagate downstream.
//! - [`scheduler_step`] defines the result type for scheduler steps.

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod validate;

pub use graph::Dag;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use validate::{validate_dag, validate_job_set};
