#![allow(dead_code)]

pub use workdag_test_utils::{
    ConcurrencyGauge, ConfigFileBuilder, JobConfigBuilder, Script, ScriptedJob, as_job_refs,
    dag_from, init_tracing, with_timeout,
};

use workdag::dag::Dag;

/// `{A:[], B:[A], C:[A], D:[B,C], E:[D]}`
pub fn diamond_dag() -> Dag {
    dag_from(&[
        ("A", &[]),
        ("B", &["A"]),
        ("C", &["A"]),
        ("D", &["B", "C"]),
        ("E", &["D"]),
    ])
}

/// Owned strings for comparing against `Vec<JobName>`.
pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
