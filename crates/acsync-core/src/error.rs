//! Error types for acsync-core

use std::path::PathBuf;

/// Result type for acsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// How a failure affects the surrounding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Logged and swallowed
    Warning,
    /// One item is skipped, the run continues
    Recoverable,
    /// On-disk state may be inconsistent; triggers rollback
    Fatal,
}

/// Errors that can occur in acsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Temp write, sync or rename failed
    #[error("Atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: acsync_fs::Error,
    },

    /// A backup copy could not be taken, so the mutation must not proceed
    #[error("Failed to back up {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: acsync_fs::Error,
    },

    #[error("Rollback failed: {message}")]
    Rollback { message: String },

    #[error("Manifest error at {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to hash {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid exclusion glob in the project config
    #[error("Invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// No home directory could be determined and none was given
    #[error("Could not determine the home directory")]
    NoHomeDir,

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from acsync-fs
    #[error(transparent)]
    Fs(#[from] acsync_fs::Error),

    /// Adapter error from acsync-targets
    #[error(transparent)]
    Targets(#[from] acsync_targets::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Severity class of this error
    pub fn severity(&self) -> Severity {
        match self {
            Error::AtomicWrite { .. }
            | Error::Backup { .. }
            | Error::Rollback { .. }
            | Error::Manifest { .. } => Severity::Fatal,
            Error::Hash { .. } => Severity::Recoverable,
            Error::Parse { .. } => Severity::Warning,
            Error::Targets(acsync_targets::Error::Parse { .. })
            | Error::Targets(acsync_targets::Error::Frontmatter { .. })
            | Error::Targets(acsync_targets::Error::Yaml(_))
            | Error::Targets(acsync_targets::Error::Toml(_)) => Severity::Warning,
            Error::InvalidPattern { .. } | Error::NoHomeDir => Severity::Fatal,
            Error::Fs(_) | Error::Targets(_) | Error::Json(_) => Severity::Fatal,
        }
    }

    pub(crate) fn atomic_write(path: impl Into<PathBuf>, source: acsync_fs::Error) -> Self {
        Error::AtomicWrite {
            path: path.into(),
            source,
        }
    }
}
