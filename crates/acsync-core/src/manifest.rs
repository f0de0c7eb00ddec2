//! Sync manifest: last-known-installed hash per item and target
//!
//! The manifest is advisory. It never changes the outcome of a drift
//! comparison, so losing it must never block a sync: any problem reading it
//! degrades to an empty manifest.

use crate::error::{Error, Result};
use acsync_targets::{ItemType, Target};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const MANIFEST_VERSION: &str = "1.0.0";
const MANIFEST_DIR: &str = ".acsync";
const MANIFEST_FILE: &str = "manifest.json";

/// Sync status of one item at one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub hash: String,
    pub last_synced: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sync record for one canonical item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub source_hash: String,
    pub last_synced: DateTime<Utc>,
    /// Keyed by target name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The per-project sync manifest stored at `.acsync/manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    #[serde(default = "Utc::now")]
    pub last_synced: DateTime<Utc>,
    /// Keyed by `<type>/<name>`
    pub items: BTreeMap<String, ManifestItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            last_synced: Utc::now(),
            items: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Fixed manifest location for a project
    pub fn path_for(project_dir: &Path) -> PathBuf {
        project_dir.join(MANIFEST_DIR).join(MANIFEST_FILE)
    }

    /// Manifest key for an item
    pub fn key(item_type: ItemType, name: &str) -> String {
        format!("{item_type}/{name}")
    }

    /// Load the manifest at `path`.
    ///
    /// Never fails: a missing, unreadable or malformed file yields an empty
    /// manifest.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Manifest unreadable, starting empty");
                return Self::new();
            }
        };

        match serde_json::from_str::<Manifest>(&content) {
            Ok(manifest) if !manifest.version.is_empty() => manifest,
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Manifest has no version, starting empty");
                Self::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Manifest malformed, starting empty");
                Self::new()
            }
        }
    }

    /// Refresh `lastSynced` and write the manifest atomically as pretty JSON.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_synced = Utc::now();
        let manifest_error = |message: String| Error::Manifest {
            path: path.to_path_buf(),
            message,
        };

        let mut content =
            serde_json::to_string_pretty(self).map_err(|e| manifest_error(e.to_string()))?;
        content.push('\n');

        acsync_fs::io::write_atomic(path, content.as_bytes())
            .map_err(|e| manifest_error(e.to_string()))?;
        tracing::debug!(path = %path.display(), items = self.items.len(), "Saved manifest");
        Ok(())
    }

    /// Record a successful write of `name` to `target`.
    pub fn update(
        &mut self,
        item_type: ItemType,
        name: &str,
        source_hash: &str,
        target: Target,
        target_hash: &str,
    ) {
        let now = Utc::now();
        let item = self
            .items
            .entry(Self::key(item_type, name))
            .or_insert_with(|| ManifestItem {
                item_type,
                name: name.to_string(),
                source_hash: source_hash.to_string(),
                last_synced: now,
                targets: BTreeMap::new(),
                extra: Map::new(),
            });

        item.source_hash = source_hash.to_string();
        item.last_synced = now;
        let status = item
            .targets
            .entry(target.as_str().to_string())
            .or_insert_with(|| TargetStatus {
                hash: String::new(),
                last_synced: now,
                extra: Map::new(),
            });
        status.hash = target_hash.to_string();
        status.last_synced = now;
    }

    /// Last hash written to `target` for an item
    pub fn lookup(&self, item_type: ItemType, name: &str, target: Target) -> Option<&str> {
        self.items
            .get(&Self::key(item_type, name))
            .and_then(|item| item.targets.get(target.as_str()))
            .map(|status| status.hash.as_str())
    }

    pub fn item(&self, key: &str) -> Option<&ManifestItem> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
