// src/engine/mod.rs

//! Execution engine for workdag.
//!
//! The scheduling semantics (dependency counters, outcome classification,
//! skip propagation) live in the pure [`crate::dag::Scheduler`]; this module
//! is the async shell that runs jobs on Tokio, enforces the concurrency
//! ceiling and the global deadline, and propagates cancellation.

pub mod pool;

pub use pool::{DEFAULT_SHUTDOWN_GRACE, WorkerPool};
