//! Shared test utilities for the acsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`project`]: [`TestProject`](project::TestProject), a canonical project
//!   directory paired with an isolated fake home directory

pub mod project;

pub use project::TestProject;
