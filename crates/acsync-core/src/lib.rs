//! acsync-core: the sync engine
//!
//! This crate owns everything between canonical project storage and the
//! target adapters:
//!
//! - [`manifest`]: the per-project record of what was last written where
//! - [`drift`]: three-way hash comparison producing per-item operations
//! - [`exclusion`]: glob exclusions and canonical/non-canonical classification
//! - [`rollback`]: backups taken before every mutation, restored on failure
//! - [`sync`]: check, push, pull and diff over all selected targets
//!
//! Target file formats live in `acsync-targets`; atomic writes and hashing in
//! `acsync-fs`.

pub mod canonical;
pub mod config;
pub mod diff;
pub mod drift;
pub mod error;
pub mod exclusion;
pub mod manifest;
pub mod rollback;
pub mod sync;

pub use canonical::{CanonicalSource, FsCanonicalStore, Instructions, ItemIssue, ItemResult};
pub use config::SyncConfig;
pub use diff::unified_diff;
pub use drift::{
    DiffResult, McpWarning, McpWarningAction, Operation, OperationKind, Summary, calculate_diff,
    compare_hashes,
};
pub use error::{Error, Result, Severity};
pub use exclusion::{DEFAULT_EXCLUSIONS, EntryStatus, ExclusionFilter};
pub use manifest::{MANIFEST_VERSION, Manifest, ManifestItem, TargetStatus};
pub use rollback::{BackupInfo, BackupSet, RestoreSummary};
pub use sync::{
    CheckReport, FileDiff, PullAction, PullItem, PullReport, PullSource, PushReport, SyncEngine,
    SyncOptions, TargetPushResult,
};

// Re-exported so callers need only this crate for the common types
pub use acsync_targets::{ItemType, Target};
