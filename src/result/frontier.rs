// src/result/frontier.rs

use std::collections::BTreeMap;
use std::ops::Deref;

use crate::types::{JobName, JobStatus};

/// A job that explains why a run did not reach full success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub job: JobName,
    pub status: JobStatus,
    /// Direct dependencies that are not `Success`, sorted.
    pub blocked_by: Vec<JobName>,
    /// Downstream successors of `job` (including `job`), sorted.
    pub subtree: Vec<JobName>,
}

impl FrontierItem {
    pub fn is_blocked(&self) -> bool {
        !self.blocked_by.is_empty()
    }
}

/// Frontier items sorted by job name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontiers(Vec<FrontierItem>);

impl Frontiers {
    pub(crate) fn new(mut items: Vec<FrontierItem>) -> Self {
        items.sort_by(|a, b| a.job.cmp(&b.job));
        Self(items)
    }

    pub fn as_map(&self) -> BTreeMap<&str, &FrontierItem> {
        self.0.iter().map(|item| (item.job.as_str(), item)).collect()
    }

    pub fn jobs(&self) -> Vec<&str> {
        self.0.iter().map(|item| item.job.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<FrontierItem> {
        self.0
    }
}

impl Deref for Frontiers {
    type Target = [FrontierItem];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Frontiers {
    type Item = FrontierItem;
    type IntoIter = std::vec::IntoIter<FrontierItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Frontiers {
    type Item = &'a FrontierItem;
    type IntoIter = std::slice::Iter<'a, FrontierItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
