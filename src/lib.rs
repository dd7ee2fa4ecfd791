// src/lib.rs

//! `workdag` runs a DAG of jobs with bounded concurrency and a global
//! deadline, and reports per-job status plus DAG-level queries (frontier,
//! boundary subtrees, first error).
//!
//! The library is usable on its own through [`WorkerPool`] and the [`Job`]
//! trait; [`run`] is the entry point of the `workdag` binary, which builds
//! shell-command jobs from a TOML file.

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod probe;
pub mod report;
pub mod result;
pub mod store;
pub mod types;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span};

pub use crate::dag::{Dag, Scheduler, SchedulerStep};
pub use crate::engine::WorkerPool;
pub use crate::errors::{RunError, WorkdagError};
pub use crate::exec::{FnJob, Job, JobFuture, JobRef, job_fn};
pub use crate::probe::{Poller, ProbeStatus, Prober};
pub use crate::result::{DagResult, FrontierItem, Frontiers, JobResult, TIMEOUT_ERROR_KEY};
pub use crate::store::Store;
pub use crate::types::{JobName, JobStatus, RunOutcome};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate, parse_duration};
use crate::exec::jobs_from_config;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - command jobs and the worker pool
/// - Ctrl-C handling
/// - the final report on stdout
pub async fn run(args: CliArgs) -> Result<RunOutcome> {
    let config_path = args
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let mut cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    apply_overrides(&mut cfg, &args)?;

    if let Some(job) = &args.job {
        cfg = cfg
            .restrict_to(job)
            .ok_or_else(|| anyhow!("job '{job}' is not defined in {}", config_path.display()))?;
    }

    let dag = cfg.dag();

    if args.dry_run {
        print_dry_run(&cfg, &dag)?;
        return Ok(RunOutcome::DryRun);
    }

    let outputs = Store::new();
    let jobs = jobs_from_config(&cfg, &outputs);

    let pool = WorkerPool::new(cfg.concurrency, jobs, dag.clone(), cfg.timeout)?
        .with_shutdown_grace(cfg.shutdown_grace)
        .with_span(info_span!("run", config = %config_path.display()));

    // Ctrl-C → cancel the run; the pool records it like a timeout.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received; cancelling run");
            cancel.cancel();
        });
    }

    let result = pool.start_with_cancel(&cancel).await;

    print!("{}", report::render(&result, &dag, &outputs));
    Ok(report::outcome_of(&result))
}

fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) -> Result<()> {
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err(WorkdagError::InvalidConcurrency(concurrency).into());
        }
        debug!(concurrency, "overriding [config].concurrency");
        cfg.concurrency = concurrency;
    }
    if let Some(timeout) = &args.timeout {
        cfg.timeout = parse_duration(timeout).map_err(|e| anyhow!("--timeout: {e}"))?;
        debug!(timeout = ?cfg.timeout, "overriding [config].timeout");
    }
    Ok(())
}

/// Simple dry-run output: print jobs, deps, commands and execution order.
fn print_dry_run(cfg: &ConfigFile, dag: &Dag) -> Result<()> {
    println!("workdag dry-run");
    println!("  config.concurrency = {}", cfg.concurrency);
    println!("  config.timeout = {:?}", cfg.timeout);
    println!();

    println!("jobs ({}):", cfg.jobs.len());
    for (name, job) in cfg.jobs.iter() {
        println!("  - {name}");
        println!("      cmd: {}", job.cmd);
        if !job.after.is_empty() {
            println!("      after: {:?}", job.after);
        }
        if let Some(ref re) = job.ready_on_stdout {
            println!("      ready_on_stdout: {}", re.as_str());
        }
        if let Some(poll) = job.poll {
            println!("      poll_interval: {:?}", poll.interval);
            if let Some(poll_for) = poll.poll_for {
                println!("      poll_for: {poll_for:?}");
            }
        }
        if let Some(probe_timeout) = job.probe_timeout {
            println!("      probe_timeout: {probe_timeout:?}");
        }
    }

    println!();
    println!("order: {}", dag.topological_order()?.join(" -> "));

    debug!("dry-run complete (no execution)");
    Ok(())
}
