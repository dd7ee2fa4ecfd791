#![allow(dead_code)]

use workdag::config::{ConfigFile, ConfigSection, JobConfig, RawConfigFile};
use workdag::dag::Dag;

/// Build a DAG from `(job, deps)` pairs.
///
/// `dag_from(&[("A", &[]), ("B", &["A"])])`
pub fn dag_from(edges: &[(&str, &[&str])]) -> Dag {
    edges
        .iter()
        .map(|(job, deps)| (job.to_string(), deps.iter().map(|d| d.to_string())))
        .collect()
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                job: Default::default(),
            },
        }
    }

    pub fn with_job(mut self, name: &str, job: JobConfig) -> Self {
        self.config.job.insert(name.to_string(), job);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.config.concurrency = n;
        self
    }

    pub fn timeout(mut self, duration: &str) -> Self {
        self.config.config.timeout = duration.to_string();
        self
    }

    pub fn shutdown_grace(mut self, duration: &str) -> Self {
        self.config.config.shutdown_grace = duration.to_string();
        self
    }

    /// The raw, unvalidated file (for exercising validation errors).
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            job: JobConfig {
                cmd: cmd.to_string(),
                after: vec![],
                ready_on_stdout: None,
                poll_interval: None,
                poll_for: None,
                probe_timeout: None,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.job.after.push(dep.to_string());
        self
    }

    pub fn ready_on_stdout(mut self, pattern: &str) -> Self {
        self.job.ready_on_stdout = Some(pattern.to_string());
        self
    }

    pub fn poll_interval(mut self, duration: &str) -> Self {
        self.job.poll_interval = Some(duration.to_string());
        self
    }

    pub fn poll_for(mut self, duration: &str) -> Self {
        self.job.poll_for = Some(duration.to_string());
        self
    }

    pub fn probe_timeout(mut self, duration: &str) -> Self {
        self.job.probe_timeout = Some(duration.to_string());
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
