//! SHA-256 fingerprints
//!
//! One canonical digest format (`sha256:<hex>`) is the sole equality oracle
//! for drift detection: rendered canonical content, on-disk target content and
//! the manifest all speak it.

use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::Path;

/// Prefix for all fingerprints produced by this module
const PREFIX: &str = "sha256:";

/// Fingerprint a byte sequence.
pub fn fingerprint(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Fingerprint a file's contents.
///
/// Returns `Ok(None)` when the file does not exist. An empty file is *not*
/// absent: it fingerprints like any other content.
///
/// # Errors
///
/// Returns any I/O error other than `NotFound`.
pub fn fingerprint_file(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(fingerprint(bytes))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Fingerprint an installed target file, treating any read failure as absent.
///
/// An unreadable target is equivalent to "not installed yet".
pub fn fingerprint_target(path: &Path) -> Option<String> {
    match fingerprint_file(path) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "treating unreadable target file as absent");
            None
        }
    }
}

/// Fingerprint an ordered sequence of labelled parts.
///
/// Each label and payload is length-prefixed so that moving bytes between
/// parts always changes the digest.
pub fn fingerprint_parts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut hasher = Sha256::new();
    for (label, bytes) in parts {
        hasher.update((label.len() as u64).to_le_bytes());
        hasher.update(label.as_bytes());
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    format!("{}{:x}", PREFIX, hasher.finalize())
}
