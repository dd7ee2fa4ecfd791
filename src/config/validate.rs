// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, JobConfig, JobSpec, PollSpec, RawConfigFile};
use crate::errors::{Result, WorkdagError};
use crate::types::JobName;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WorkdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;

        let timeout = duration_field("[config].timeout", &raw.config.timeout)?;
        let shutdown_grace =
            duration_field("[config].shutdown_grace", &raw.config.shutdown_grace)?;

        let mut jobs = BTreeMap::new();
        for (name, job) in raw.job.iter() {
            jobs.insert(name.clone(), resolve_job(name, job)?);
        }

        let config = ConfigFile::new_unchecked(raw.config.concurrency, timeout, shutdown_grace, jobs);
        config.dag().validate()?;
        Ok(config)
    }
}

/// Cheap structural checks that don't need anything parsed.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_global_config(cfg)?;
    validate_job_commands(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(WorkdagError::ConfigError(
            "config must contain at least one [job.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.concurrency == 0 {
        return Err(WorkdagError::InvalidConcurrency(0));
    }
    Ok(())
}

fn validate_job_commands(cfg: &RawConfigFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        if job.cmd.trim().is_empty() {
            return Err(WorkdagError::ConfigError(format!(
                "job '{}' has an empty `cmd`",
                name
            )));
        }
        if job.poll_for.is_some() && job.poll_interval.is_none() {
            return Err(WorkdagError::ConfigError(format!(
                "job '{}' sets `poll_for` without `poll_interval`",
                name
            )));
        }
    }
    Ok(())
}

fn resolve_job(name: &JobName, job: &JobConfig) -> Result<JobSpec> {
    let ready_on_stdout = match job.ready_on_stdout.as_deref() {
        Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
            WorkdagError::ConfigError(format!(
                "job '{}' has an invalid `ready_on_stdout` regex: {}",
                name, e
            ))
        })?),
        None => None,
    };

    let probe_timeout = optional_duration(name, "probe_timeout", job.probe_timeout.as_deref())?;

    let poll = match optional_duration(name, "poll_interval", job.poll_interval.as_deref())? {
        Some(interval) if interval.is_zero() => {
            return Err(WorkdagError::ConfigError(format!(
                "job '{}' has a zero `poll_interval`",
                name
            )));
        }
        Some(interval) => Some(PollSpec {
            interval,
            poll_for: optional_duration(name, "poll_for", job.poll_for.as_deref())?,
        }),
        None => None,
    };

    Ok(JobSpec {
        name: name.clone(),
        cmd: job.cmd.clone(),
        after: job.after.clone(),
        ready_on_stdout,
        probe_timeout,
        poll,
    })
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| WorkdagError::ConfigError(format!("{}: {}", field, e)))
}

fn optional_duration(job: &str, field: &str, value: Option<&str>) -> Result<Option<Duration>> {
    value
        .map(|v| duration_field(&format!("job '{}' `{}`", job, field), v))
        .transpose()
}
