// src/result/mod.rs

//! Result model of a DAG run.
//!
//! - [`job_result`] holds the per-job status record.
//! - [`dag_result`] holds the aggregate map plus run-level predicates.
//! - [`queries`] computes graph-aware views (blockers, frontier, boundary)
//!   over a finished result and the DAG it was produced from.
//! - [`frontier`] defines the frontier item types returned by those queries.
//!
//! Everything here is pure: the engine fills a `DagResult` during a run and
//! hands it to the caller, who may query it any number of times.

pub mod dag_result;
pub mod frontier;
pub mod job_result;
pub mod queries;

pub use dag_result::{DagResult, TIMEOUT_ERROR_KEY};
pub use frontier::{FrontierItem, Frontiers};
pub use job_result::JobResult;
