use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use workdag::exec::{Job, JobFuture, JobRef};

/// What a [`ScriptedJob`] does once its delay has passed.
#[derive(Debug, Clone)]
pub enum Script {
    /// `Ok(true)`
    Ready,
    /// `Ok(false)`
    NotReady,
    /// `Err(msg)`
    Fail(String),
    /// Wait for cancellation, then return `Ok(false)`.
    HangUntilCancelled,
    /// Ignore cancellation entirely and sleep this long.
    Stubborn(Duration),
    /// Panic inside the job future.
    Panic,
}

/// Tracks how many jobs sharing it run at the same time.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl ConcurrencyGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Highest number of concurrently running jobs observed so far.
    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A fake job that:
/// - counts how often it was invoked
/// - optionally sleeps first (honouring cancellation)
/// - then behaves as scripted
#[derive(Debug)]
pub struct ScriptedJob {
    name: String,
    script: Script,
    delay: Duration,
    invocations: AtomicUsize,
    gauge: Option<Arc<ConcurrencyGauge>>,
}

impl ScriptedJob {
    pub fn new(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            script,
            delay: Duration::ZERO,
            invocations: AtomicUsize::new(0),
            gauge: None,
        }
    }

    pub fn ready(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name, Script::Ready))
    }

    pub fn not_ready(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name, Script::NotReady))
    }

    pub fn failing(name: &str, msg: &str) -> Arc<Self> {
        Arc::new(Self::new(name, Script::Fail(msg.to_string())))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_gauge(mut self, gauge: Arc<ConcurrencyGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl Job for ScriptedJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, cancel: CancellationToken) -> JobFuture<'_> {
        Box::pin(async move {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if let Some(gauge) = &self.gauge {
                gauge.enter();
            }

            let outcome = async {
                if !self.delay.is_zero() {
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(false),
                        _ = tokio::time::sleep(self.delay) => {}
                    }
                }

                match &self.script {
                    Script::Ready => Ok(true),
                    Script::NotReady => Ok(false),
                    Script::Fail(msg) => Err(anyhow::anyhow!("{msg}")),
                    Script::HangUntilCancelled => {
                        cancel.cancelled().await;
                        Ok(false)
                    }
                    Script::Stubborn(d) => {
                        tokio::time::sleep(*d).await;
                        Ok(true)
                    }
                    Script::Panic => panic!("scripted panic in job '{}'", self.name),
                }
            }
            .await;

            if let Some(gauge) = &self.gauge {
                gauge.exit();
            }
            outcome
        })
    }
}

/// Erase a list of scripted jobs into pool inputs, leaving the concrete handles
/// for inspection.
pub fn as_job_refs(jobs: &[Arc<ScriptedJob>]) -> Vec<JobRef> {
    jobs.iter().map(|j| Arc::clone(j) as JobRef).collect()
}
