//! Check report types

use crate::canonical::ItemIssue;
use crate::drift::{DiffResult, Summary};
use acsync_targets::Target;
use serde::Serialize;

/// Result of a read-only check across targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// One plan per target, in priority order
    pub diffs: Vec<DiffResult>,
    /// Any create or update anywhere. Deletes alone are not drift.
    pub has_drift: bool,
    /// Items that could not be read or rendered
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ItemIssue>,
}

impl CheckReport {
    pub fn new(diffs: Vec<DiffResult>, issues: Vec<ItemIssue>) -> Self {
        let has_drift = diffs.iter().any(DiffResult::has_drift);
        Self {
            diffs,
            has_drift,
            issues,
        }
    }

    pub fn diff_for(&self, target: Target) -> Option<&DiffResult> {
        self.diffs.iter().find(|d| d.target == target)
    }

    /// Operation counts summed over all targets
    pub fn summary(&self) -> Summary {
        let mut total = Summary::default();
        for diff in &self.diffs {
            total.create += diff.summary.create;
            total.update += diff.summary.update;
            total.skip += diff.summary.skip;
            total.delete += diff.summary.delete;
        }
        total
    }

    pub fn has_deletes(&self) -> bool {
        self.diffs.iter().any(|d| d.summary.delete > 0)
    }
}
