// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, WorkdagError};
use crate::types::JobName;

/// Dependency graph keyed by job name.
///
/// Each entry maps a job to the jobs it depends on (edge `job -> dep` means
/// "`job` requires `dep` to succeed first"). The same type is used for the
/// reversed, successor-edge view returned by [`Dag::reverse`].
///
/// A `BTreeMap` keeps iteration order lexicographic so every traversal is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dag {
    edges: BTreeMap<JobName, Vec<JobName>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literals in tests and examples.
    pub fn with_job<I, S>(mut self, job: impl Into<JobName>, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<JobName>,
    {
        self.insert(job, deps);
        self
    }

    /// Insert (or replace) a job and its direct dependencies.
    ///
    /// Duplicate dependency names are collapsed.
    pub fn insert<I, S>(&mut self, job: impl Into<JobName>, deps: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<JobName>,
    {
        let mut list: Vec<JobName> = Vec::new();
        for dep in deps {
            let dep = dep.into();
            if !list.contains(&dep) {
                list.push(dep);
            }
        }
        self.edges.insert(job.into(), list);
    }

    /// All job names, in lexicographic order.
    pub fn jobs(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, job: &str) -> bool {
        self.edges.contains_key(job)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Direct edges out of `job`. Empty for unknown names.
    pub fn dependencies_of(&self, job: &str) -> &[JobName] {
        self.edges
            .get(job)
            .map(|deps| deps.as_slice())
            .unwrap_or(&[])
    }

    /// Jobs without dependencies; these are eligible as soon as a run starts.
    pub fn roots(&self) -> Vec<JobName> {
        self.edges
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(job, _)| job.clone())
            .collect()
    }

    /// Successor edges: `dep -> [jobs that depend on dep]`.
    ///
    /// Every key of `self` is present in the result, even with no successors.
    pub fn reverse(&self) -> Dag {
        let mut rev: BTreeMap<JobName, Vec<JobName>> = self
            .edges
            .keys()
            .map(|job| (job.clone(), Vec::new()))
            .collect();

        for (job, deps) in &self.edges {
            for dep in deps {
                rev.entry(dep.clone()).or_default().push(job.clone());
            }
        }

        Dag { edges: rev }
    }

    /// All nodes reachable from `root` by following edges, `root` included,
    /// sorted lexicographically.
    ///
    /// Applied to `self` this is the dependency closure of `root`; applied to
    /// [`Dag::reverse`] it is the downstream successor set.
    pub fn subtree(&self, root: &str) -> Vec<JobName> {
        let mut seen: HashSet<&str> = HashSet::from([root]);
        let mut pending: Vec<&str> = vec![root];
        let mut out: Vec<JobName> = Vec::new();

        while let Some(node) = pending.pop() {
            out.push(node.to_string());
            for next in self.dependencies_of(node) {
                if seen.insert(next.as_str()) {
                    pending.push(next.as_str());
                }
            }
        }

        out.sort();
        out
    }

    /// Validate that every edge points at a known job, no job uses the
    /// reserved sentinel name, and the graph is acyclic.
    pub fn validate(&self) -> Result<()> {
        super::validate::validate_dag(self)
    }

    /// Depth-first search for a cycle.
    ///
    /// Returns the offending path (first node repeated at the end) if a node
    /// still on the DFS path is reached again. The path is an explicit stack
    /// of `(node, next edge index)` frames.
    pub fn find_cycle(&self) -> Option<Vec<JobName>> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();

        for start in self.jobs() {
            if marks.contains_key(start) {
                continue;
            }
            marks.insert(start, Mark::Visiting);
            let mut path: Vec<(&str, usize)> = vec![(start, 0)];

            while let Some(frame) = path.last_mut() {
                let (node, idx) = *frame;
                let deps = self.dependencies_of(node);
                let Some(next) = deps.get(idx) else {
                    marks.insert(node, Mark::Done);
                    path.pop();
                    continue;
                };
                frame.1 += 1;

                match marks.get(next.as_str()) {
                    Some(Mark::Visiting) => {
                        let from = path
                            .iter()
                            .position(|(n, _)| *n == next.as_str())
                            .unwrap_or(0);
                        let mut cycle: Vec<JobName> =
                            path[from..].iter().map(|(n, _)| n.to_string()).collect();
                        cycle.push(next.clone());
                        return Some(cycle);
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next.as_str(), Mark::Visiting);
                        path.push((next.as_str(), 0));
                    }
                }
            }
        }
        None
    }

    /// A dependency-respecting execution order (dependencies first).
    ///
    /// Used for dry-run output; the engine itself dispatches by live counters.
    pub fn topological_order(&self) -> Result<Vec<JobName>> {
        // Edge direction: dep -> job.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for job in self.jobs() {
            graph.add_node(job);
        }
        for (job, deps) in &self.edges {
            for dep in deps {
                graph.add_edge(dep.as_str(), job.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|s| s.to_string()).collect()),
            Err(cycle) => Err(WorkdagError::DagCycle(format!(
                "cycle detected in job DAG involving job '{}'",
                cycle.node_id()
            ))),
        }
    }

    /// Sub-DAG made of `root` and everything it transitively depends on.
    ///
    /// Returns `None` if `root` is not a job of this DAG.
    pub fn restrict_to_dependencies_of(&self, root: &str) -> Option<Dag> {
        if !self.contains(root) {
            return None;
        }
        let edges = self
            .subtree(root)
            .into_iter()
            .filter_map(|job| {
                let deps = self.edges.get(&job)?.clone();
                Some((job, deps))
            })
            .collect();
        Some(Dag { edges })
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (&JobName, &Vec<JobName>)> {
        self.edges.iter()
    }
}

impl<K, I, S> FromIterator<(K, I)> for Dag
where
    K: Into<JobName>,
    I: IntoIterator<Item = S>,
    S: Into<JobName>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut dag = Dag::new();
        for (job, deps) in iter {
            dag.insert(job, deps);
        }
        dag
    }
}
