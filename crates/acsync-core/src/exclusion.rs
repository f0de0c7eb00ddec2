//! Ignore rules and canonical-membership classification
//!
//! The same filter hides bookkeeping files from canonical scans and target
//! scans alike.

use crate::error::{Error, Result};
use glob::Pattern;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Patterns that are always excluded
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "gsd-*",
    "gsd",
    ".acsync-backup-*",
    ".sync-manifest.json",
    ".gsd-file-manifest.json",
    ".DS_Store",
    ".tmp-*",
    ".*.tmp",
];

/// How a name found on disk relates to the canonical set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    Canonical,
    Excluded,
    NonCanonical,
}

/// Basename glob filter
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<Pattern>,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_EXCLUSIONS
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

impl ExclusionFilter {
    /// Default patterns plus `extra`. An invalid extra pattern is an error.
    pub fn with_patterns<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for raw in extra {
            let raw = raw.as_ref();
            let pattern = Pattern::new(raw).map_err(|e| Error::InvalidPattern {
                pattern: raw.to_string(),
                message: e.to_string(),
            })?;
            filter.patterns.push(pattern);
        }
        Ok(filter)
    }

    /// Whether `name` (matched by its last path component) is excluded
    pub fn is_excluded(&self, name: &str) -> bool {
        let basename = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name);
        self.patterns.iter().any(|p| p.matches(basename))
    }

    /// Classify `name` against the canonical set. Exclusion wins.
    pub fn classify(&self, name: &str, canonical: &BTreeSet<String>) -> EntryStatus {
        if self.is_excluded(name) {
            EntryStatus::Excluded
        } else if canonical.contains(name) {
            EntryStatus::Canonical
        } else {
            EntryStatus::NonCanonical
        }
    }
}
