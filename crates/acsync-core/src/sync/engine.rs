//! SyncEngine: check and diff, plus the shared planning entry point
//!
//! Push and pull live in their own modules as further `impl SyncEngine`
//! blocks.

use super::check::CheckReport;
use super::options::SyncOptions;
use super::plan::{Payload, Snapshot, TargetPlan, plan_target};
use crate::canonical::FsCanonicalStore;
use crate::config::SyncConfig;
use crate::diff::unified_diff;
use crate::error::{Error, Result};
use crate::exclusion::ExclusionFilter;
use crate::manifest::Manifest;
use acsync_targets::{ItemType, SKILL_FILE, Target, TargetAdapter, adapter_for};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A display-only diff of one target file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    pub target: Target,
    pub item_type: ItemType,
    pub name: String,
    pub path: PathBuf,
    pub diff: String,
}

/// Coordinates canonical storage, the manifest and the target adapters
pub struct SyncEngine {
    project_dir: PathBuf,
    home_dir: PathBuf,
    config: SyncConfig,
    exclusions: ExclusionFilter,
    store: FsCanonicalStore,
}

impl SyncEngine {
    /// Create an engine for `project_dir`, resolving targets under `home_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project config exists but is malformed or
    /// contains an invalid exclusion pattern.
    pub fn new(project_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Result<Self> {
        let project_dir = project_dir.into();
        let config = SyncConfig::load(&project_dir)?;
        let exclusions = config.exclusion_filter()?;
        let store = FsCanonicalStore::new(project_dir.clone(), exclusions.clone());
        Ok(Self {
            project_dir,
            home_dir: home_dir.into(),
            config,
            exclusions,
            store,
        })
    }

    /// Create an engine from options, defaulting the home directory.
    pub fn from_options(options: &SyncOptions) -> Result<Self> {
        let home_dir = match &options.home_dir {
            Some(home) => home.clone(),
            None => dirs::home_dir().ok_or(Error::NoHomeDir)?,
        };
        Self::new(options.project_dir.clone(), home_dir)
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &FsCanonicalStore {
        &self.store
    }

    pub(crate) fn exclusions(&self) -> &ExclusionFilter {
        &self.exclusions
    }

    pub fn manifest_path(&self) -> PathBuf {
        Manifest::path_for(&self.project_dir)
    }

    pub fn adapter(&self, target: Target) -> Box<dyn TargetAdapter> {
        adapter_for(target, &self.home_dir)
    }

    pub(crate) fn targets(&self, options: &SyncOptions) -> Vec<Target> {
        options.resolve_targets(&self.config.default_targets())
    }

    /// Read the canonical snapshot once and plan every selected target from it.
    pub(crate) fn plan(&self, options: &SyncOptions, manifest: &Manifest) -> (Snapshot, Vec<TargetPlan>) {
        let targets = self.targets(options);
        let snapshot = Snapshot::load(&self.store, options, &targets);
        let plans = targets
            .into_iter()
            .map(|target| {
                let adapter = self.adapter(target);
                plan_target(
                    adapter.as_ref(),
                    &snapshot,
                    &self.store,
                    manifest,
                    &self.exclusions,
                    options,
                )
            })
            .collect();
        (snapshot, plans)
    }

    /// Detect drift without writing anything.
    pub fn check(&self, options: &SyncOptions) -> Result<CheckReport> {
        let manifest = Manifest::load(&self.manifest_path());
        let (snapshot, plans) = self.plan(options, &manifest);
        let report = check_report(&snapshot, &plans);
        tracing::info!(
            targets = report.diffs.len(),
            has_drift = report.has_drift,
            issues = report.issues.len(),
            "Check complete"
        );
        Ok(report)
    }

    /// Unified diffs of every file a push would create or update.
    pub fn diff(&self, options: &SyncOptions) -> Result<Vec<FileDiff>> {
        let manifest = Manifest::load(&self.manifest_path());
        let (snapshot, plans) = self.plan(options, &manifest);
        let mut diffs = Vec::new();

        for plan in &plans {
            let adapter = self.adapter(plan.target);
            let mut seen: HashSet<PathBuf> = HashSet::new();

            for op in plan.ops.iter().filter(|op| op.operation.kind.is_drift()) {
                let operation = &op.operation;
                let Some(path) = operation.target_path.clone() else {
                    continue;
                };
                if !seen.insert(path.clone()) {
                    continue;
                }

                let mut files: Vec<(PathBuf, String)> = Vec::new();
                match &op.payload {
                    Payload::File(content) => files.push((path, content.clone())),
                    Payload::Skill {
                        content,
                        support_files,
                    } => {
                        files.push((path.join(SKILL_FILE), content.clone()));
                        for file in support_files {
                            files.push((
                                path.join(&file.relative_path),
                                String::from_utf8_lossy(&file.content).into_owned(),
                            ));
                        }
                    }
                    Payload::Mcp => {
                        let existing = acsync_fs::io::read_text_opt(&path)?;
                        let rendered =
                            adapter.render_mcp_servers(&snapshot.servers, existing.as_deref())?;
                        files.push((path, rendered));
                    }
                    Payload::Delete => {}
                }

                for (file, new) in files {
                    let old = read_lossy(&file)?;
                    if let Some(diff) = unified_diff(&old, &new, &self.display_path(&file)) {
                        diffs.push(FileDiff {
                            target: plan.target,
                            item_type: operation.item_type,
                            name: operation.name.clone(),
                            path: file,
                            diff,
                        });
                    }
                }
            }
        }
        Ok(diffs)
    }

    /// Path shown in diff headers: relative to home when possible
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.home_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

pub(crate) fn check_report(snapshot: &Snapshot, plans: &[TargetPlan]) -> CheckReport {
    let mut issues = snapshot.issues.clone();
    for plan in plans {
        issues.extend(plan.issues.iter().cloned());
    }
    CheckReport::new(plans.iter().map(TargetPlan::diff).collect(), issues)
}

/// Current file content for diffing; absent is empty
fn read_lossy(path: &Path) -> Result<String> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(acsync_fs::Error::io(path, e).into()),
    }
}
