//! acsync CLI
//!
//! Syncs commands, agents, MCP servers, instructions and skills between a
//! project's canonical configs and the installed coding assistants.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, Scope};
use error::{CliError, Result};

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Run the parsed command and return the process exit code
fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose).map_err(|e| CliError::user(format!("logging setup failed: {e}")))?;
    tracing::debug!(project = %cli.project_dir.display(), "Starting");

    match &cli.command {
        Commands::Check {
            scope,
            pretty,
            json: _,
        } => commands::run_check(&cli.options(scope), *pretty),
        Commands::Push {
            scope,
            dry_run,
            force,
            delete_stale,
            pretty,
        } => {
            let options = cli
                .options(scope)
                .dry_run(*dry_run)
                .force(*force)
                .delete_stale(*delete_stale);
            commands::run_push(&options, *pretty)
        }
        Commands::Pull {
            source,
            dry_run,
            force,
            pretty,
        } => {
            let options = cli
                .options(&Scope::default())
                .dry_run(*dry_run)
                .force(*force);
            commands::run_pull(*source, &options, *pretty)
        }
        Commands::Diff { scope } => commands::run_diff(&cli.options(scope)),
    }
}
