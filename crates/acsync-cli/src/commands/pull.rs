//! Pull command implementation

use acsync_core::{PullAction, PullReport, PullSource, SyncEngine, SyncOptions};
use colored::Colorize;

use super::{EXIT_FAILURE, print_issues, print_json};
use crate::error::Result;

/// Run the pull command. Exit code 1 when the pull rolled back.
pub fn run_pull(source: PullSource, options: &SyncOptions, pretty: bool) -> Result<i32> {
    let engine = SyncEngine::from_options(options)?;
    let report = engine.pull(source, options)?;

    if pretty {
        print_pull(&report);
    } else {
        print_json(&report)?;
    }

    Ok(if report.success() { 0 } else { EXIT_FAILURE })
}

fn print_pull(report: &PullReport) {
    let header = if report.dry_run {
        format!("Would pull from {}", report.source)
    } else {
        format!("Pulled from {}", report.source)
    };
    println!("{}", header.bold());

    for item in &report.items {
        let from = item.source.map(|t| format!(" <- {t}")).unwrap_or_default();
        match item.action {
            PullAction::Create => {
                println!("  {} {} {}{}", "+".green(), item.item_type, item.name.green(), from)
            }
            PullAction::Skip => println!(
                "  {} {} {}  (already canonical)",
                "=".dimmed(),
                item.item_type,
                item.name.dimmed()
            ),
        }
    }
    print_issues(&report.issues);

    println!();
    if let Some(error) = &report.error {
        println!("{} {error} (rolled back)", "FAILED".red().bold());
    } else {
        println!("{} pulled, {} skipped", report.pulled, report.skipped);
    }
}
