// src/probe/mod.rs

//! Readiness probing helpers for job implementations.
//!
//! The worker pool never polls anything itself: a job that needs to wait for
//! some external condition does so internally, typically with a [`Poller`]
//! bounded by the cancellation token it was given.
//!
//! - [`Prober`] runs one readiness check under a timeout.
//! - [`Poller`] repeats a prober at a fixed interval until the check settles
//!   or the token is cancelled.

use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::Error;

/// Result of a readiness check.
#[derive(Debug)]
pub enum ProbeStatus {
    Ready,
    InProgress,
    Error(Error),
}

impl ProbeStatus {
    /// Map a job-style `(ready, error)` result onto a probe status.
    pub fn from_readiness(readiness: Result<bool, Error>) -> Self {
        match readiness {
            Ok(true) => ProbeStatus::Ready,
            Ok(false) => ProbeStatus::InProgress,
            Err(err) => ProbeStatus::Error(err),
        }
    }

    /// Inverse of [`ProbeStatus::from_readiness`]; what a job returns.
    pub fn into_readiness(self) -> Result<bool, Error> {
        match self {
            ProbeStatus::Ready => Ok(true),
            ProbeStatus::InProgress => Ok(false),
            ProbeStatus::Error(err) => Err(err),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeStatus::Ready)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, ProbeStatus::InProgress)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProbeStatus::Error(_))
    }
}

/// Single readiness check bounded by a timeout.
#[derive(Debug, Clone, Copy)]
pub struct Prober {
    timeout: Duration,
}

impl Prober {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `check` once. Exceeding the timeout is reported as an error.
    pub async fn probe<F, Fut>(&self, check: F) -> ProbeStatus
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, Error>>,
    {
        match tokio::time::timeout(self.timeout, check()).await {
            Ok(readiness) => ProbeStatus::from_readiness(readiness),
            Err(_) => ProbeStatus::Error(anyhow!("probe timed out after {:?}", self.timeout)),
        }
    }
}

/// Repeats a [`Prober`] at a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    prober: Prober,
    interval: Duration,
}

impl Poller {
    pub fn new(prober: Prober, interval: Duration) -> Self {
        Self { prober, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Probe until the check reports `Ready` or `Error`.
    ///
    /// The first attempt happens immediately. Returns `InProgress` as soon
    /// as `cancel` fires, including in the middle of an attempt.
    pub async fn poll<F, Fut>(&self, cancel: &CancellationToken, mut check: F) -> ProbeStatus
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, Error>>,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(attempts, "poller cancelled while waiting; reporting in progress");
                    return ProbeStatus::InProgress;
                }
                _ = ticker.tick() => {}
            }

            attempts += 1;
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(attempts, "poller cancelled during probe; reporting in progress");
                    return ProbeStatus::InProgress;
                }
                status = self.prober.probe(&mut check) => status,
            };

            match status {
                ProbeStatus::InProgress => {
                    debug!(attempts, "probe not ready yet; polling again");
                }
                settled => return settled,
            }
        }
    }
}
