//! Sync orchestration
//!
//! [`SyncEngine`] reads canonical state once per call, plans every selected
//! target from that snapshot, and then either reports (check, diff), writes
//! targets (push) or writes canonical storage (pull).

mod check;
mod engine;
mod options;
mod plan;
mod pull;
mod push;
mod stale;

pub use check::CheckReport;
pub use engine::{FileDiff, SyncEngine};
pub use options::SyncOptions;
pub use plan::INSTRUCTIONS_NAME;
pub use pull::{PullAction, PullItem, PullReport, PullSource};
pub use push::{PushReport, TargetPushResult};
