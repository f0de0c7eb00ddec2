//! Command implementations for acsync-cli
//!
//! Each command returns the process exit code. JSON goes to stdout unless
//! `--pretty` is given.

mod check;
mod diff;
mod pull;
mod push;

pub use check::run_check;
pub use diff::run_diff;
pub use pull::run_pull;
pub use push::run_push;

use acsync_core::{ItemIssue, Severity};
use colored::Colorize;
use serde::Serialize;

/// Drift found, or diffs printed
pub const EXIT_DRIFT: i32 = 2;
pub const EXIT_FAILURE: i32 = 1;

pub(crate) fn print_json<T: Serialize>(value: &T) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_issues(issues: &[ItemIssue]) {
    if issues.is_empty() {
        return;
    }
    println!();
    println!("{}", "Issues:".yellow().bold());
    for issue in issues {
        let marker = match issue.severity {
            Severity::Warning => "!".yellow(),
            Severity::Recoverable | Severity::Fatal => "!".red(),
        };
        let place = issue
            .target
            .map(|t| format!(" @ {t}"))
            .unwrap_or_default();
        println!(
            "  {} {} {}{}: {}",
            marker, issue.item_type, issue.name, place, issue.message
        );
    }
}
