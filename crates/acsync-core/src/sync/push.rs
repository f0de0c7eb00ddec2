//! Push: write canonical state to targets, one rollback scope per target

use super::engine::{SyncEngine, check_report};
use super::options::SyncOptions;
use super::plan::{Payload, PlannedOp, TargetPlan};
use crate::canonical::ItemIssue;
use crate::drift::{DiffResult, Operation, OperationKind};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::rollback::BackupSet;
use acsync_fs::fingerprint;
use acsync_targets::{ItemType, McpServer, SKILL_FILE, SupportFile, Target, TargetAdapter};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Outcome of pushing to one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPushResult {
    pub target: Target,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Files physically written
    pub written: usize,
    pub deleted: usize,
}

/// Result of a push across targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushReport {
    pub diffs: Vec<DiffResult>,
    pub has_drift: bool,
    pub dry_run: bool,
    pub targets: Vec<TargetPushResult>,
    pub written: usize,
    pub deleted: usize,
    /// Number of targets that failed and were rolled back
    pub failed: usize,
    pub rolled_back: bool,
    pub manifest_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ItemIssue>,
}

impl PushReport {
    /// No target rolled back and the manifest was persisted if it had to be
    pub fn success(&self) -> bool {
        self.failed == 0 && self.manifest_error.is_none()
    }
}

struct ManifestUpdate {
    item_type: ItemType,
    name: String,
    source_hash: String,
    target_hash: String,
}

/// One target's mutations, all backed up before they happen
struct TargetBatch<'a> {
    adapter: &'a dyn TargetAdapter,
    servers: &'a [McpServer],
    backups: BackupSet,
    /// Hash of what was written per path, so shared paths are written once
    written_paths: HashMap<PathBuf, String>,
    updates: Vec<ManifestUpdate>,
    deleted: usize,
}

impl<'a> TargetBatch<'a> {
    fn new(adapter: &'a dyn TargetAdapter, servers: &'a [McpServer]) -> Self {
        Self {
            adapter,
            servers,
            backups: BackupSet::new(),
            written_paths: HashMap::new(),
            updates: Vec::new(),
            deleted: 0,
        }
    }

    fn execute(&mut self, plan: &TargetPlan, options: &SyncOptions) -> Result<()> {
        for op in plan.ops.iter().filter(|op| should_write(&op.operation, options)) {
            let operation = &op.operation;
            let Some(path) = operation.target_path.as_deref() else {
                continue;
            };
            let target_hash = match self.written_paths.get(path) {
                Some(hash) => hash.clone(),
                None => {
                    let hash = self.write(path, op)?;
                    self.written_paths.insert(path.to_path_buf(), hash.clone());
                    hash
                }
            };
            self.updates.push(ManifestUpdate {
                item_type: operation.item_type,
                name: operation.name.clone(),
                source_hash: operation
                    .new_hash
                    .clone()
                    .unwrap_or_else(|| target_hash.clone()),
                target_hash,
            });
        }

        if options.delete_stale {
            let deletes = plan
                .ops
                .iter()
                .filter(|op| op.operation.kind == OperationKind::Delete);
            for op in deletes {
                if let Some(path) = op.operation.target_path.as_deref() {
                    self.delete(path)?;
                }
            }
        }
        Ok(())
    }

    /// Write one planned payload and return the hash of what landed
    fn write(&mut self, path: &Path, op: &PlannedOp) -> Result<String> {
        tracing::debug!(
            target_name = %self.adapter.target(),
            item_type = %op.operation.item_type,
            name = %op.operation.name,
            path = %path.display(),
            "Writing"
        );
        match &op.payload {
            Payload::File(content) => {
                self.backups.backup(path)?;
                write_file(path, content.as_bytes())?;
                Ok(fingerprint(content))
            }
            Payload::Skill {
                content,
                support_files,
            } => {
                self.backups.backup(path)?;
                write_skill(path, content, support_files)?;
                Ok(op.operation.new_hash.clone().unwrap_or_default())
            }
            Payload::Mcp => {
                // Merge against the copy taken just now, never the live file
                let existing = match &self.backups.backup(path)?.backup_path {
                    Some(backup) => Some(acsync_fs::io::read_text(backup)?),
                    None => None,
                };
                let content = self
                    .adapter
                    .render_mcp_servers(self.servers, existing.as_deref())?;
                write_file(path, content.as_bytes())?;
                Ok(fingerprint(&content))
            }
            Payload::Delete => {
                self.delete(path)?;
                Ok(String::new())
            }
        }
    }

    fn delete(&mut self, path: &Path) -> Result<()> {
        tracing::debug!(target_name = %self.adapter.target(), path = %path.display(), "Deleting stale item");
        self.backups.backup(path)?;
        acsync_fs::io::remove_path(path)?;
        self.deleted += 1;
        Ok(())
    }
}

/// Creates and updates always; up-to-date items too when forced
fn should_write(operation: &Operation, options: &SyncOptions) -> bool {
    match operation.kind {
        OperationKind::Create | OperationKind::Update => true,
        OperationKind::Skip => {
            options.force && operation.old_hash.is_some() && operation.new_hash.is_some()
        }
        OperationKind::Delete => false,
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    acsync_fs::io::write_atomic(path, content).map_err(|e| Error::atomic_write(path, e))
}

fn write_skill(dir: &Path, content: &str, support_files: &[SupportFile]) -> Result<()> {
    write_file(&dir.join(SKILL_FILE), content.as_bytes())?;
    for file in support_files {
        write_file(&dir.join(&file.relative_path), &file.content)?;
    }
    Ok(())
}

impl SyncEngine {
    /// Push canonical state to the selected targets.
    ///
    /// Each target is one all-or-nothing batch: on the first failure every
    /// change made to that target is rolled back and the remaining targets
    /// still run. The manifest is saved only when no target rolled back.
    pub fn push(&self, options: &SyncOptions) -> Result<PushReport> {
        let manifest_path = self.manifest_path();
        let mut manifest = Manifest::load(&manifest_path);
        let (snapshot, plans) = self.plan(options, &manifest);
        let check = check_report(&snapshot, &plans);

        let mut report = PushReport {
            diffs: check.diffs,
            has_drift: check.has_drift,
            dry_run: options.dry_run,
            targets: Vec::new(),
            written: 0,
            deleted: 0,
            failed: 0,
            rolled_back: false,
            manifest_saved: false,
            manifest_error: None,
            issues: check.issues,
        };

        let has_deletes = options.delete_stale && plans.iter().any(TargetPlan::has_deletes);
        let has_forced = plans
            .iter()
            .flat_map(|p| &p.ops)
            .any(|op| should_write(&op.operation, options));
        if !report.has_drift && !has_deletes && !has_forced {
            tracing::info!("Nothing to push");
            return Ok(report);
        }
        if options.dry_run {
            return Ok(report);
        }

        let mut committed = Vec::new();
        for plan in &plans {
            let adapter = self.adapter(plan.target);
            let mut batch = TargetBatch::new(adapter.as_ref(), &snapshot.servers);

            match batch.execute(plan, options) {
                Ok(()) => {
                    let written = batch.written_paths.len();
                    let deleted = batch.deleted;
                    batch.backups.commit();
                    tracing::info!(target_name = %plan.target, written, deleted, "Pushed");
                    committed.push((plan.target, batch.updates));
                    report.written += written;
                    report.deleted += deleted;
                    report.targets.push(TargetPushResult {
                        target: plan.target,
                        success: true,
                        error: None,
                        written,
                        deleted,
                    });
                }
                Err(e) => {
                    let restored = batch.backups.rollback();
                    tracing::warn!(
                        target_name = %plan.target,
                        error = %e,
                        restored = restored.restored,
                        failed = restored.failed,
                        "Push failed, rolled back"
                    );
                    report.failed += 1;
                    report.rolled_back = true;
                    report.targets.push(TargetPushResult {
                        target: plan.target,
                        success: false,
                        error: Some(e.to_string()),
                        written: 0,
                        deleted: 0,
                    });
                }
            }
        }

        if report.rolled_back {
            tracing::warn!("Manifest not saved because a target rolled back");
            return Ok(report);
        }

        for (target, updates) in committed {
            for update in updates {
                manifest.update(
                    update.item_type,
                    &update.name,
                    &update.source_hash,
                    target,
                    &update.target_hash,
                );
            }
        }
        match manifest.save(&manifest_path) {
            Ok(()) => report.manifest_saved = true,
            Err(e) => {
                tracing::error!(error = %e, severity = ?e.severity(), "Failed to save manifest");
                report.manifest_error = Some(e.to_string());
            }
        }
        Ok(report)
    }
}
