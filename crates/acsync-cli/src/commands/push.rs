//! Push command implementation

use acsync_core::{PushReport, SyncEngine, SyncOptions};
use colored::Colorize;

use super::check::print_target;
use super::{EXIT_FAILURE, print_issues, print_json};
use crate::error::Result;

/// Run the push command. Exit code 1 when any target failed or the manifest
/// could not be saved.
pub fn run_push(options: &SyncOptions, pretty: bool) -> Result<i32> {
    let engine = SyncEngine::from_options(options)?;
    let report = engine.push(options)?;

    if pretty {
        print_push(&report);
    } else {
        print_json(&report)?;
    }

    Ok(if report.success() { 0 } else { EXIT_FAILURE })
}

fn print_push(report: &PushReport) {
    if report.dry_run {
        println!("{}", "Dry run, nothing written".yellow().bold());
        println!();
        for diff in &report.diffs {
            print_target(diff);
        }
        print_issues(&report.issues);
        return;
    }

    if report.targets.is_empty() {
        println!("{} Nothing to push.", "OK".green().bold());
        print_issues(&report.issues);
        return;
    }

    for target in &report.targets {
        if target.success {
            println!(
                "{} {}: {} written, {} deleted",
                "OK".green().bold(),
                target.target,
                target.written,
                target.deleted
            );
        } else {
            println!(
                "{} {}: {} (rolled back)",
                "FAILED".red().bold(),
                target.target,
                target.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    print_issues(&report.issues);

    println!();
    if report.manifest_saved {
        println!("Manifest updated.");
    } else if let Some(error) = &report.manifest_error {
        println!("{} manifest not saved: {error}", "!".red());
    } else if report.rolled_back {
        println!("{} manifest not saved because a target rolled back", "!".yellow());
    }
}
