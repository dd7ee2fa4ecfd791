// src/result/queries.rs

//! Graph-aware views over a finished [`DagResult`].
//!
//! All functions take the DAG the run was started with; they never mutate
//! the result and can be called any number of times.

use std::collections::{HashMap, HashSet};

use crate::dag::Dag;
use crate::result::{DagResult, FrontierItem, Frontiers};
use crate::types::{JobName, JobStatus};

impl DagResult {
    /// Direct dependencies of `job` that are not `Success`, sorted.
    pub fn blockers(&self, dag: &Dag, job: &str) -> Vec<JobName> {
        let mut out: Vec<JobName> = dag
            .dependencies_of(job)
            .iter()
            .filter(|dep| !self.is_success(dep))
            .cloned()
            .collect();
        out.sort();
        out
    }

    /// Every node reachable from `root` along the edges of `dag`, `root`
    /// included, sorted.
    ///
    /// Pass `dag.reverse()` to walk downstream successors instead of
    /// dependencies.
    pub fn subtree(&self, dag: &Dag, root: &str) -> Vec<JobName> {
        dag.subtree(root)
    }

    /// Jobs that explain why the run is stuck.
    ///
    /// Successes are ignored. `Failed` and `InProgress` jobs are always
    /// included; `Unknown` and `Skipped` jobs only when none of their direct
    /// dependencies is blocking them.
    pub fn frontiers(&self, dag: &Dag) -> Frontiers {
        let successors = dag.reverse();
        let mut items = Vec::new();

        for job in dag.jobs() {
            let status = self.status_of(job);
            if status == JobStatus::Success {
                continue;
            }

            let blocked_by = self.blockers(dag, job);
            let interesting = matches!(status, JobStatus::Failed | JobStatus::InProgress)
                || blocked_by.is_empty();

            if interesting {
                items.push(FrontierItem {
                    job: job.to_string(),
                    status,
                    blocked_by,
                    subtree: successors.subtree(job),
                });
            }
        }

        Frontiers::new(items)
    }

    /// Successful jobs with at least one non-successful job downstream: the
    /// edge between finished and unfinished work. Sorted.
    pub fn boundary_subtrees(&self, dag: &Dag) -> Vec<JobName> {
        let successors = dag.reverse();
        let mut memo: HashMap<&str, bool> = HashMap::new();

        let mut out = Vec::new();
        for job in dag.jobs() {
            if !self.is_success(job) {
                continue;
            }
            if self.has_unfinished_downstream(&successors, job, &mut memo) {
                out.push(job.to_string());
            }
        }
        out.sort();
        out
    }

    /// Post-order walk over `successors` from `job`, memoising per node
    /// whether anything below it is not `Success`.
    fn has_unfinished_downstream<'a>(
        &self,
        successors: &'a Dag,
        job: &'a str,
        memo: &mut HashMap<&'a str, bool>,
    ) -> bool {
        if let Some(&known) = memo.get(job) {
            return known;
        }

        let mut visiting: HashSet<&str> = HashSet::from([job]);
        let mut stack: Vec<(&str, usize)> = vec![(job, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, idx) = *frame;
            let next_nodes = successors.dependencies_of(node);

            let Some(next) = next_nodes.get(idx) else {
                let found = next_nodes.iter().any(|n| {
                    !self.is_success(n) || memo.get(n.as_str()).copied().unwrap_or(false)
                });
                memo.insert(node, found);
                visiting.remove(node);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            // A node already on the path is only reachable through a cycle.
            if memo.contains_key(next.as_str()) || !visiting.insert(next.as_str()) {
                continue;
            }
            stack.push((next.as_str(), 0));
        }

        memo.get(job).copied().unwrap_or(false)
    }
}
