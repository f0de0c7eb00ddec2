//! Per-invocation options shared by every sync operation

use acsync_targets::{ItemType, Target};
use std::path::PathBuf;

/// Flags and scoping for check, push, pull and diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Targets to operate on. Empty means the configured default.
    pub targets: Vec<Target>,
    /// Item types to operate on. Empty means all.
    pub types: Vec<ItemType>,
    /// Plan only, write nothing
    pub dry_run: bool,
    /// Push: re-render up-to-date items. Pull: overwrite canonical items.
    pub force: bool,
    /// Push: execute stale deletes
    pub delete_stale: bool,
    pub project_dir: PathBuf,
    /// Defaults to the user's home directory
    pub home_dir: Option<PathBuf>,
}

impl SyncOptions {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_home(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home_dir.into());
        self
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Target>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = ItemType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn delete_stale(mut self, delete_stale: bool) -> Self {
        self.delete_stale = delete_stale;
        self
    }

    /// Whether `item_type` is in scope
    pub fn includes_type(&self, item_type: ItemType) -> bool {
        self.types.is_empty() || self.types.contains(&item_type)
    }

    /// Selected targets in priority order, falling back to `default`
    pub fn resolve_targets(&self, default: &[Target]) -> Vec<Target> {
        let selected: &[Target] = if self.targets.is_empty() {
            default
        } else {
            &self.targets
        };
        Target::ALL
            .into_iter()
            .filter(|t| selected.contains(t))
            .collect()
    }
}
