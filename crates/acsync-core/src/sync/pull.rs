//! Pull: bring target-installed items back into canonical storage

use super::engine::SyncEngine;
use super::options::SyncOptions;
use crate::canonical::{CanonicalSource, ItemIssue};
use crate::error::{Error, Result};
use crate::exclusion::EntryStatus;
use crate::rollback::BackupSet;
use acsync_targets::{
    CanonicalItem, ItemType, SKILL_FILE, Target, TargetAdapter, frontmatter,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const PULLED_TYPES: [ItemType; 3] = [ItemType::Command, ItemType::Agent, ItemType::Skill];

/// Where a pull reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullSource {
    Target(Target),
    All,
}

impl fmt::Display for PullSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullSource::Target(target) => write!(f, "{target}"),
            PullSource::All => f.write_str("all"),
        }
    }
}

impl FromStr for PullSource {
    type Err = acsync_targets::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(PullSource::All)
        } else {
            s.parse().map(PullSource::Target)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PullAction {
    Create,
    Skip,
}

/// One discovered item and what pull does with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub action: PullAction,
    /// Canonical destination
    pub target_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Target>,
}

impl PullItem {
    fn key(&self) -> (ItemType, String) {
        (self.item_type, self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    /// Target name or `all`
    pub source: String,
    pub items: Vec<PullItem>,
    pub pulled: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub rolled_back: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ItemIssue>,
}

impl PullReport {
    fn new(source: impl Into<String>, dry_run: bool) -> Self {
        Self {
            source: source.into(),
            items: Vec::new(),
            pulled: 0,
            skipped: 0,
            dry_run,
            rolled_back: false,
            error: None,
            issues: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    fn absorb(&mut self, other: PullReport) {
        self.items.extend(other.items);
        self.pulled += other.pulled;
        self.skipped += other.skipped;
        self.rolled_back |= other.rolled_back;
        if self.error.is_none() {
            self.error = other.error;
        }
        self.issues.extend(other.issues);
    }
}

type ItemKey = (ItemType, String);

impl SyncEngine {
    /// Pull from one target, or from all of them with first-target-wins
    /// deduplication.
    pub fn pull(&self, source: PullSource, options: &SyncOptions) -> Result<PullReport> {
        match source {
            PullSource::Target(target) => self.pull_target(target, options, None),
            PullSource::All => self.pull_all(options),
        }
    }

    /// Pull from every selected target in priority order.
    ///
    /// A dry run over all targets decides which target owns each
    /// `(type, name)` key. The first target to report a key wins it, skipped
    /// items included, so no item is written twice.
    pub fn pull_all(&self, options: &SyncOptions) -> Result<PullReport> {
        let targets = options.resolve_targets(&Target::ALL);
        let discovery = options.clone().dry_run(true);

        let mut seen: BTreeSet<ItemKey> = BTreeSet::new();
        let mut claims: Vec<(Target, BTreeSet<ItemKey>)> = Vec::new();
        let mut report = PullReport::new(PullSource::All.to_string(), options.dry_run);

        for &target in &targets {
            let found = self.pull_target(target, &discovery, None)?;
            let mut won = BTreeSet::new();
            for item in found.items {
                if !seen.insert(item.key()) {
                    tracing::debug!(target_name = %target, item_type = %item.item_type, name = %item.name, "Claimed by an earlier target");
                    continue;
                }
                match item.action {
                    PullAction::Create => {
                        won.insert(item.key());
                        if options.dry_run {
                            report.pulled += 1;
                            report.items.push(item);
                        }
                    }
                    PullAction::Skip => {
                        report.skipped += 1;
                        report.items.push(item);
                    }
                }
            }
            report.issues.extend(found.issues);
            claims.push((target, won));
        }

        if options.dry_run {
            return Ok(report);
        }

        for (target, keys) in claims {
            if keys.is_empty() {
                continue;
            }
            let mut pulled = self.pull_target(target, options, Some(&keys))?;
            // Skips were already counted during discovery
            pulled.items.retain(|item| item.action == PullAction::Create);
            pulled.skipped = 0;
            report.absorb(pulled);
            if report.rolled_back {
                break;
            }
        }
        Ok(report)
    }

    fn pull_target(
        &self,
        target: Target,
        options: &SyncOptions,
        only_keys: Option<&BTreeSet<ItemKey>>,
    ) -> Result<PullReport> {
        let adapter = self.adapter(target);
        let mut report = PullReport::new(target.to_string(), options.dry_run);
        let mut creates = Vec::new();

        for item_type in PULLED_TYPES {
            if !options.includes_type(item_type) || !adapter.capabilities().supports(item_type) {
                continue;
            }
            let canonical = self.store().existing_names(item_type)?;
            let installed = match item_type {
                ItemType::Command => adapter.list_existing_command_names()?,
                ItemType::Agent => adapter.list_existing_agent_names()?,
                _ => adapter.list_existing_skill_names()?,
            };

            for name in installed {
                let action = match self.exclusions().classify(&name, &canonical) {
                    EntryStatus::Excluded => continue,
                    EntryStatus::Canonical if !options.force => PullAction::Skip,
                    _ => PullAction::Create,
                };
                let item = PullItem {
                    item_type,
                    target_path: self.store().item_path(item_type, &name),
                    name,
                    action,
                    source: Some(target),
                };
                if only_keys.is_some_and(|keys| !keys.contains(&item.key())) {
                    continue;
                }
                match action {
                    PullAction::Create => creates.push(item),
                    PullAction::Skip => {
                        report.skipped += 1;
                        report.items.push(item);
                    }
                }
            }
        }

        if options.dry_run {
            report.pulled = creates.len();
            report.items.extend(creates);
            return Ok(report);
        }

        let mut backups = BackupSet::new();
        for item in creates {
            let loaded = match load_installed(adapter.as_ref(), &item) {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::warn!(target_name = %target, item_type = %item.item_type, name = %item.name, error = %e, "Skipping item");
                    report
                        .issues
                        .push(ItemIssue::new(item.item_type, &item.name, &e).at(target));
                    continue;
                }
            };
            if let Err(e) = self.write_canonical(&item, &loaded, &mut backups) {
                let restored = backups.rollback();
                tracing::warn!(
                    target_name = %target,
                    error = %e,
                    restored = restored.restored,
                    failed = restored.failed,
                    "Pull failed, rolled back"
                );
                report.rolled_back = true;
                report.error = Some(e.to_string());
                report.pulled = 0;
                report.items.retain(|i| i.action == PullAction::Skip);
                return Ok(report);
            }
            tracing::debug!(target_name = %target, item_type = %item.item_type, name = %item.name, "Pulled");
            report.pulled += 1;
            report.items.push(item);
        }
        backups.commit();
        tracing::info!(target_name = %target, pulled = report.pulled, skipped = report.skipped, "Pull complete");
        Ok(report)
    }

    /// Write one pulled item under backup. Any error here is fatal for the call.
    fn write_canonical(
        &self,
        item: &PullItem,
        loaded: &CanonicalItem,
        backups: &mut BackupSet,
    ) -> Result<()> {
        let content = frontmatter::stringify(&loaded.content, &loaded.metadata)?;
        if item.item_type != ItemType::Skill {
            backups.backup(&item.target_path)?;
            return write(&item.target_path, content.as_bytes());
        }

        let dir = self.store().skill_dir(&item.name);
        backups.backup(&dir)?;
        acsync_fs::io::remove_path(&dir)?;
        write(&dir.join(SKILL_FILE), content.as_bytes())?;
        for file in &loaded.support_files {
            write(&dir.join(&file.relative_path), &file.content)?;
        }
        Ok(())
    }
}

/// Read and reverse-parse an installed item
fn load_installed(adapter: &dyn TargetAdapter, item: &PullItem) -> Result<CanonicalItem> {
    let paths = adapter.paths();
    let loaded = match item.item_type {
        ItemType::Command => {
            let raw = acsync_fs::io::read_text(&paths.command_file(&item.name))?;
            adapter.parse_command(&item.name, &raw)?
        }
        ItemType::Agent => {
            let raw = acsync_fs::io::read_text(&paths.agent_file(&item.name))?;
            adapter.parse_agent(&item.name, &raw)?
        }
        _ => adapter.read_skill(&item.name)?,
    };
    Ok(loaded)
}

fn write(path: &Path, content: &[u8]) -> Result<()> {
    acsync_fs::io::write_atomic(path, content).map_err(|e| Error::atomic_write(path, e))
}
