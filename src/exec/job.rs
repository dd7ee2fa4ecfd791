// src/exec/job.rs

//! The job contract consumed by the worker pool.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::errors::Error;
use crate::types::JobName;

/// Future returned by [`Job::run`].
///
/// Resolves to `Ok(true)` when the job is ready, `Ok(false)` when it ran
/// fine but is not ready yet, and `Err(_)` when it failed.
pub type JobFuture<'a> = Pin<Box<dyn Future<Output = Result<bool, Error>> + Send + 'a>>;

/// A named unit of work.
///
/// Implementations must be safe to run concurrently with other jobs and
/// should return promptly once `cancel` fires; the pool never interrupts a
/// running job itself.
pub trait Job: Send + Sync {
    /// Stable identity; must match the job's key in the DAG.
    fn name(&self) -> &str;

    /// Execute the job under the run-scoped cancellation token.
    fn run(&self, cancel: CancellationToken) -> JobFuture<'_>;
}

/// Shared handle to a job, as held by the worker pool.
pub type JobRef = Arc<dyn Job>;

/// Job backed by an async closure.
pub struct FnJob<F> {
    name: JobName,
    f: F,
}

impl<F, Fut> FnJob<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, Error>> + Send + 'static,
{
    pub fn new(name: impl Into<JobName>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnJob<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnJob")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> Job for FnJob<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, Error>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, cancel: CancellationToken) -> JobFuture<'_> {
        Box::pin((self.f)(cancel))
    }
}

/// Convenience constructor returning a ready-to-use [`JobRef`].
pub fn job_fn<F, Fut>(name: impl Into<JobName>, f: F) -> JobRef
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, Error>> + Send + 'static,
{
    Arc::new(FnJob::new(name, f))
}
