//! Project configuration (`.acsync/config.toml`)

use crate::error::Result;
use crate::exclusion::ExclusionFilter;
use acsync_fs::ConfigStore;
use acsync_targets::Target;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

/// Optional per-project settings. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Extra basename globs to ignore on both sides
    pub exclusions: Vec<String>,
    /// Targets used when none are named on the command line
    pub targets: Vec<Target>,
}

impl SyncConfig {
    pub fn path_for(project_dir: &Path) -> PathBuf {
        project_dir.join(".acsync").join(CONFIG_FILE)
    }

    /// Load the project config. A missing file yields the defaults; a
    /// malformed one is an error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(&Self::path_for(project_dir))?)
    }

    /// Configured default targets in priority order, all four when unset
    pub fn default_targets(&self) -> Vec<Target> {
        if self.targets.is_empty() {
            Target::ALL.to_vec()
        } else {
            Target::ALL
                .into_iter()
                .filter(|t| self.targets.contains(t))
                .collect()
        }
    }

    pub fn exclusion_filter(&self) -> Result<ExclusionFilter> {
        ExclusionFilter::with_patterns(&self.exclusions)
    }
}
