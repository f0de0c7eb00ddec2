//! Backup-before-mutate and reverse-order restore
//!
//! Every mutation of a target path is preceded by [`create_backup`]. If a
//! batch fails, [`restore_all`] walks the backups newest first, so a path
//! touched twice ends up with its oldest content. Restoring never fails; each
//! problem is logged and counted.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const BACKUP_PREFIX: &str = ".acsync-backup-";

/// Record of a path's state immediately before a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub original_path: PathBuf,
    /// `None` when the original did not exist
    pub backup_path: Option<PathBuf>,
    pub existed: bool,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of [`restore_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub restored: usize,
    pub failed: usize,
}

/// Copy `path` (file or directory) to a private sibling before it is mutated.
///
/// An absent path yields `existed: false`, and restoring it means deleting
/// whatever was created since.
pub fn create_backup(path: &Path) -> Result<BackupInfo> {
    let timestamp = Utc::now();
    match std::fs::symlink_metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(BackupInfo {
                original_path: path.to_path_buf(),
                backup_path: None,
                existed: false,
                timestamp,
            });
        }
        Err(e) => {
            return Err(Error::Backup {
                path: path.to_path_buf(),
                source: acsync_fs::Error::io(path, e),
            });
        }
    }

    let backup_path = backup_sibling(path, timestamp)?;
    acsync_fs::io::copy_recursive(path, &backup_path).map_err(|source| {
        let _ = acsync_fs::io::remove_path(&backup_path);
        Error::Backup {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(path = %path.display(), backup = %backup_path.display(), "Backed up");

    Ok(BackupInfo {
        original_path: path.to_path_buf(),
        backup_path: Some(backup_path),
        existed: true,
        timestamp,
    })
}

fn backup_sibling(path: &Path, timestamp: DateTime<Utc>) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| Error::Backup {
        path: path.to_path_buf(),
        source: acsync_fs::Error::InvalidPath {
            path: path.to_path_buf(),
        },
    })?;
    let id = uuid::Uuid::new_v4().simple().to_string();
    Ok(path.with_file_name(format!(
        "{BACKUP_PREFIX}{}-{}-{}",
        timestamp.timestamp_millis(),
        &id[..8],
        name.to_string_lossy()
    )))
}

/// Put one path back the way [`create_backup`] found it. Returns `false` on
/// failure instead of erroring.
pub fn restore_backup(info: &BackupInfo) -> bool {
    let result = match (&info.backup_path, info.existed) {
        (_, false) => acsync_fs::io::remove_path(&info.original_path),
        (Some(backup), true) => restore_from(backup, &info.original_path),
        (None, true) => return false,
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %info.original_path.display(), error = %e, "Failed to restore");
            false
        }
    }
}

fn restore_from(backup: &Path, original: &Path) -> acsync_fs::Result<()> {
    if backup.is_dir() {
        acsync_fs::io::remove_path(original)?;
        acsync_fs::io::copy_recursive(backup, original)
    } else {
        let bytes = std::fs::read(backup).map_err(|e| acsync_fs::Error::io(backup, e))?;
        if original.is_dir() {
            acsync_fs::io::remove_path(original)?;
        }
        acsync_fs::io::write_atomic(original, &bytes)
    }
}

/// Restore every backup, newest first. Never fails.
pub fn restore_all(backups: &[BackupInfo]) -> RestoreSummary {
    let mut summary = RestoreSummary::default();
    for info in backups.iter().rev() {
        if restore_backup(info) {
            summary.restored += 1;
        } else {
            summary.failed += 1;
        }
    }
    summary
}

/// Delete the backup copies after a successful batch. Best effort.
pub fn cleanup_all(backups: &[BackupInfo]) {
    for backup in backups.iter().filter_map(|b| b.backup_path.as_deref()) {
        if let Err(e) = acsync_fs::io::remove_path(backup) {
            tracing::warn!(path = %backup.display(), error = %e, "Failed to remove backup");
        }
    }
}

/// The backups taken during one batch of mutations
#[derive(Debug, Default)]
pub struct BackupSet {
    backups: Vec<BackupInfo>,
}

impl BackupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back up `path` and remember it for rollback.
    pub fn backup(&mut self, path: &Path) -> Result<&BackupInfo> {
        let info = create_backup(path)?;
        self.backups.push(info);
        Ok(&self.backups[self.backups.len() - 1])
    }

    pub fn backups(&self) -> &[BackupInfo] {
        &self.backups
    }

    pub fn is_empty(&self) -> bool {
        self.backups.is_empty()
    }

    /// Undo the batch. Backup copies are kept only if a restore failed.
    pub fn rollback(self) -> RestoreSummary {
        let summary = restore_all(&self.backups);
        if summary.failed > 0 {
            tracing::warn!(
                restored = summary.restored,
                failed = summary.failed,
                "Rollback incomplete, keeping backups"
            );
        } else {
            cleanup_all(&self.backups);
        }
        summary
    }

    /// Keep the batch and drop the backup copies
    pub fn commit(self) {
        cleanup_all(&self.backups);
    }
}
