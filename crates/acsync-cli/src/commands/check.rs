//! Check command implementation

use acsync_core::{CheckReport, DiffResult, McpWarningAction, OperationKind, SyncEngine, SyncOptions};
use colored::Colorize;

use super::{EXIT_DRIFT, print_issues, print_json};
use crate::error::Result;

/// Run the check command. Exit code 2 signals drift.
pub fn run_check(options: &SyncOptions, pretty: bool) -> Result<i32> {
    let engine = SyncEngine::from_options(options)?;
    let report = engine.check(options)?;

    if pretty {
        print_check(&report);
    } else {
        print_json(&report)?;
    }

    Ok(if report.has_drift { EXIT_DRIFT } else { 0 })
}

fn print_check(report: &CheckReport) {
    for diff in &report.diffs {
        print_target(diff);
    }
    print_issues(&report.issues);

    let summary = report.summary();
    println!();
    if report.has_drift {
        println!(
            "{} {} to create, {} to update, {} up to date",
            "Drift".yellow().bold(),
            summary.create,
            summary.update,
            summary.skip
        );
        println!("Run {} to apply.", "acsync push".cyan());
    } else {
        println!("{} Everything is in sync.", "OK".green().bold());
    }
    if summary.delete > 0 {
        println!(
            "{} stale item(s) found. Run {} to remove them.",
            summary.delete,
            "acsync push --delete".cyan()
        );
    }
}

pub(crate) fn print_target(diff: &DiffResult) {
    println!("{}", diff.target.to_string().bold());
    let mut shown = 0;
    for op in &diff.operations {
        let line = format!("{} {}", op.item_type, op.name);
        match op.kind {
            OperationKind::Create => println!("  {} {}", "+".green(), line.green()),
            OperationKind::Update => println!("  {} {}  ({})", "~".yellow(), line.yellow(), op.reason),
            OperationKind::Delete => println!("  {} {}  (stale)", "-".red(), line.red()),
            OperationKind::Skip => continue,
        }
        shown += 1;
    }
    if let Some(warning) = &diff.mcp_warning {
        let effect = match warning.action {
            McpWarningAction::Remove => "removed on push",
            McpWarningAction::Orphan => "left in place",
        };
        println!(
            "  {} unmanaged MCP servers ({effect}): {}",
            "!".yellow(),
            warning.server_names.join(", ")
        );
    }
    if shown == 0 {
        println!("  {}", "in sync".dimmed());
    }
}
