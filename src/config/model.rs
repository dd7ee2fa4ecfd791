// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::dag::Dag;
use crate::types::JobName;

/// Top-level configuration exactly as read from a TOML file.
///
/// ```toml
/// [config]
/// concurrency = 4
/// timeout = "10m"
///
/// [job.A]
/// cmd = "echo A"
///
/// [job.B]
/// cmd = "./check.sh"
/// after = ["A"]
/// ready_on_stdout = "^ready"
/// ```
///
/// All sections are optional and have reasonable defaults. Durations and
/// patterns are kept as strings here; they are parsed and checked when the
/// raw file is converted into a [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Run-wide settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All jobs from `[job.<name>]`, keyed by job name.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of jobs running at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Global deadline for the whole run, e.g. `"90s"` or `"10m"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// How long to wait for in-flight jobs after a timeout or cancellation
    /// before abandoning them.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: String,
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> String {
    "10m".to_string()
}

fn default_shutdown_grace() -> String {
    "5s".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout: default_timeout(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

/// `[job.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Shell command to execute.
    pub cmd: String,

    /// Dependency list: this job waits for every job listed here to succeed.
    #[serde(default)]
    pub after: Vec<String>,

    /// If set, a zero exit status only counts as "ready" when some stdout
    /// line matches this regex; otherwise the job is reported in progress.
    #[serde(default)]
    pub ready_on_stdout: Option<String>,

    /// If set, re-run the command at this interval until it is ready.
    #[serde(default)]
    pub poll_interval: Option<String>,

    /// Upper bound on polling; once elapsed the job reports in progress.
    #[serde(default)]
    pub poll_for: Option<String>,

    /// Upper bound on a single execution of the command.
    #[serde(default)]
    pub probe_timeout: Option<String>,
}

/// Validated configuration, with durations and patterns parsed.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `config::validate`), so holders can rely on the DAG being valid.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub concurrency: usize,
    pub timeout: Duration,
    pub shutdown_grace: Duration,
    pub jobs: BTreeMap<JobName, JobSpec>,
}

/// A single job with its settings resolved.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: JobName,
    pub cmd: String,
    pub after: Vec<JobName>,
    pub ready_on_stdout: Option<Regex>,
    pub probe_timeout: Option<Duration>,
    pub poll: Option<PollSpec>,
}

/// Polling settings for a job (`poll_interval` / `poll_for`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    pub interval: Duration,
    pub poll_for: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        concurrency: usize,
        timeout: Duration,
        shutdown_grace: Duration,
        jobs: BTreeMap<JobName, JobSpec>,
    ) -> Self {
        Self {
            concurrency,
            timeout,
            shutdown_grace,
            jobs,
        }
    }

    /// Dependency graph described by the `after` lists.
    pub fn dag(&self) -> Dag {
        self.jobs
            .values()
            .map(|job| (job.name.clone(), job.after.clone()))
            .collect()
    }

    /// Keep only `job` and everything it transitively depends on.
    ///
    /// Returns `None` if `job` is not defined.
    pub fn restrict_to(&self, job: &str) -> Option<ConfigFile> {
        let sub = self.dag().restrict_to_dependencies_of(job)?;
        let jobs = self
            .jobs
            .iter()
            .filter(|(name, _)| sub.contains(name))
            .map(|(name, spec)| (name.clone(), spec.clone()))
            .collect();
        Some(Self { jobs, ..self.clone() })
    }
}
