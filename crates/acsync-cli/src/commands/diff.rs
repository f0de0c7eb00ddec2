//! Diff command implementation
//!
//! Prints unified diffs of every file push would write.

use acsync_core::{SyncEngine, SyncOptions};
use colored::Colorize;

use super::EXIT_DRIFT;
use crate::error::Result;

/// Run the diff command. Exit code 2 when any diff is printed.
pub fn run_diff(options: &SyncOptions) -> Result<i32> {
    let engine = SyncEngine::from_options(options)?;
    let diffs = engine.diff(options)?;

    if diffs.is_empty() {
        eprintln!("{} No changes.", "OK".green().bold());
        return Ok(0);
    }

    for file in &diffs {
        println!(
            "{}",
            format!("# {} {} {}", file.target, file.item_type, file.name).dimmed()
        );
        for line in file.diff.lines() {
            println!("{}", colorize(line));
        }
    }
    Ok(EXIT_DRIFT)
}

fn colorize(line: &str) -> colored::ColoredString {
    if line.starts_with("+++") || line.starts_with("---") {
        line.bold()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else if line.starts_with("@@") {
        line.cyan()
    } else {
        line.normal()
    }
}
