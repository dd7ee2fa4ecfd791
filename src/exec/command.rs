// src/exec/command.rs

//! Shell-command jobs, as described by `[job.<name>]` config sections.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{ConfigFile, JobSpec};
use crate::errors::Error;
use crate::exec::job::{Job, JobFuture, JobRef};
use crate::probe::{Poller, ProbeStatus, Prober};
use crate::store::Store;
use crate::types::JobName;

/// Runs a shell command and maps its exit to the job contract:
///
/// - non-zero exit: error (exit code plus the last stderr line)
/// - zero exit: ready, unless `ready_on_stdout` is set and no stdout line
///   matches it, in which case the job is "not ready"
///
/// With polling configured, the command is re-run until it is ready, fails,
/// `poll_for` elapses, or the run is cancelled.
///
/// A cancelled job kills its process and reports "not ready", leaving the
/// error that cancelled the run as the only failure.
#[derive(Debug, Clone)]
pub struct CommandJob {
    spec: JobSpec,
    outputs: Option<Store<JobName, String>>,
}

impl CommandJob {
    pub fn new(spec: JobSpec) -> Self {
        Self {
            spec,
            outputs: None,
        }
    }

    /// Record the last stdout line of every execution in `outputs`.
    pub fn with_outputs(mut self, outputs: Store<JobName, String>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    async fn run_polling(&self, cancel: &CancellationToken) -> Result<bool, Error> {
        let Some(poll) = self.spec.poll else {
            return self.run_once(cancel).await;
        };

        let prober = Prober::new(self.spec.probe_timeout.unwrap_or(Duration::MAX));
        let poller = Poller::new(prober, poll.interval);
        let polling = poller.poll(cancel, || self.execute(cancel));

        let status = match poll.poll_for {
            Some(limit) => match tokio::time::timeout(limit, polling).await {
                Ok(status) => status,
                Err(_) => {
                    info!(job = %self.spec.name, ?limit, "job still not ready when polling window closed");
                    ProbeStatus::InProgress
                }
            },
            None => polling.await,
        };

        status.into_readiness()
    }

    async fn run_once(&self, cancel: &CancellationToken) -> Result<bool, Error> {
        match self.spec.probe_timeout {
            Some(limit) => Prober::new(limit)
                .probe(|| self.execute(cancel))
                .await
                .into_readiness(),
            None => self.execute(cancel).await,
        }
    }

    /// One execution of the command.
    async fn execute(&self, cancel: &CancellationToken) -> Result<bool, Error> {
        let name = &self.spec.name;
        debug!(job = %name, cmd = %self.spec.cmd, "starting job process");

        let mut cmd = shell_command(&self.spec.cmd);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning process for job '{}'", name))?;

        // Dropping the child on cancellation kills it (kill_on_drop).
        let output = tokio::select! {
            output = child.wait_with_output() => {
                output.with_context(|| format!("waiting for process of job '{}'", name))?
            }
            _ = cancel.cancelled() => {
                info!(job = %name, "cancellation requested; killing job process");
                return Ok(false);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        for line in stderr.lines() {
            debug!(job = %name, "stderr: {}", line);
        }

        if let (Some(outputs), Some(last)) = (&self.outputs, last_line(&stdout)) {
            outputs.set(name.clone(), last.to_string());
        }

        let code = output.status.code().unwrap_or(-1);
        if !output.status.success() {
            match last_line(&stderr) {
                Some(line) => bail!("job '{}' exited with status {}: {}", name, code, line),
                None => bail!("job '{}' exited with status {}", name, code),
            }
        }

        let ready = match &self.spec.ready_on_stdout {
            Some(re) => stdout.lines().any(|line| re.is_match(line)),
            None => true,
        };

        info!(job = %name, exit_code = code, ready, "job process exited");
        Ok(ready)
    }
}

impl Job for CommandJob {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn run(&self, cancel: CancellationToken) -> JobFuture<'_> {
        Box::pin(async move { self.run_polling(&cancel).await })
    }
}

/// One [`CommandJob`] per configured job, all sharing `outputs`.
pub fn jobs_from_config(cfg: &ConfigFile, outputs: &Store<JobName, String>) -> Vec<JobRef> {
    cfg.jobs
        .values()
        .map(|spec| {
            Arc::new(CommandJob::new(spec.clone()).with_outputs(outputs.clone())) as JobRef
        })
        .collect()
}

/// Build a shell command appropriate for the platform.
fn shell_command(script: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(script);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(script);
        c
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|line| !line.is_empty())
}
