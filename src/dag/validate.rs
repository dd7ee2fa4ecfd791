// src/dag/validate.rs

//! Structural validation of a [`Dag`] and of a job set against it.

use std::collections::BTreeSet;

use crate::dag::Dag;
use crate::errors::{Result, WorkdagError};
use crate::result::TIMEOUT_ERROR_KEY;

/// Validate a DAG on its own: reserved names, dangling edges, cycles.
pub fn validate_dag(dag: &Dag) -> Result<()> {
    ensure_no_reserved_names(dag)?;
    validate_dependencies(dag)?;
    ensure_acyclic(dag)?;
    Ok(())
}

/// Validate that the job names supplied to a run match the DAG keys exactly,
/// then validate the DAG itself.
pub fn validate_job_set<'a, I>(job_names: I, dag: &Dag) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for name in job_names {
        if !names.insert(name) {
            return Err(WorkdagError::DuplicateJob(name.to_string()));
        }
    }

    let keys: BTreeSet<&str> = dag.jobs().collect();

    let missing_jobs: Vec<&str> = keys.difference(&names).copied().collect();
    if !missing_jobs.is_empty() {
        return Err(WorkdagError::JobSetMismatch(format!(
            "DAG references jobs with no implementation: {:?}",
            missing_jobs
        )));
    }

    let extra_jobs: Vec<&str> = names.difference(&keys).copied().collect();
    if !extra_jobs.is_empty() {
        return Err(WorkdagError::JobSetMismatch(format!(
            "jobs missing from the DAG: {:?}",
            extra_jobs
        )));
    }

    validate_dag(dag)
}

fn ensure_no_reserved_names(dag: &Dag) -> Result<()> {
    if dag.contains(TIMEOUT_ERROR_KEY) {
        return Err(WorkdagError::ReservedJobName(TIMEOUT_ERROR_KEY.to_string()));
    }
    Ok(())
}

fn validate_dependencies(dag: &Dag) -> Result<()> {
    for (job, deps) in dag.edges() {
        for dep in deps {
            if !dag.contains(dep) {
                return Err(WorkdagError::UnknownDependency {
                    job: job.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn ensure_acyclic(dag: &Dag) -> Result<()> {
    match dag.find_cycle() {
        None => Ok(()),
        Some(cycle) => Err(WorkdagError::DagCycle(format!(
            "cycle detected in job DAG: {}",
            cycle.join(" -> ")
        ))),
    }
}
