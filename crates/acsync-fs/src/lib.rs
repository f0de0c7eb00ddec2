//! Filesystem primitives for acsync
//!
//! Content fingerprints, crash-safe atomic writes, and a format-agnostic
//! config store. Everything above this crate treats the filesystem through
//! these helpers so that hashing and write semantics stay identical across
//! check, push and pull.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;

pub use checksum::{fingerprint, fingerprint_file, fingerprint_parts, fingerprint_target};
pub use config::ConfigStore;
pub use error::{Error, Result};
