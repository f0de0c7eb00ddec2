//! CLI argument parsing using clap derive

use acsync_core::{ItemType, PullSource, SyncOptions, Target};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// acsync - Keep AI coding assistant configs in sync with your project
#[derive(Parser, Debug)]
#[command(name = "acsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project holding the canonical configs
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Home directory the targets live under
    #[arg(long, global = true, env = "ACSYNC_HOME")]
    pub home: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Target and item type selection shared by check, push and diff
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Target to operate on (claude, opencode, gemini, codex). Repeatable.
    #[arg(short = 't', long = "target", value_parser = parse_target)]
    pub targets: Vec<Target>,

    /// Item type to operate on (commands, agents, mcps, instructions, skills). Repeatable.
    #[arg(long = "type", value_parser = parse_item_type)]
    pub types: Vec<ItemType>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Report drift between canonical configs and targets
    ///
    /// Exits 0 when in sync, 2 when drift is found, 1 on error.
    Check {
        #[command(flatten)]
        scope: Scope,

        /// Human-readable output
        #[arg(long, conflicts_with = "json")]
        pretty: bool,

        /// JSON output (default)
        #[arg(long)]
        json: bool,
    },

    /// Write canonical configs to targets
    Push {
        #[command(flatten)]
        scope: Scope,

        /// Show the plan without writing
        #[arg(long)]
        dry_run: bool,

        /// Re-render items that are already up to date
        #[arg(long)]
        force: bool,

        /// Also delete installed items no longer in the canonical set
        #[arg(long = "delete")]
        delete_stale: bool,

        /// Human-readable output
        #[arg(long)]
        pretty: bool,
    },

    /// Import target-installed items into canonical storage
    Pull {
        /// Target to pull from, or `all`
        #[arg(long, value_parser = parse_pull_source)]
        source: PullSource,

        /// Show what would be pulled without writing
        #[arg(long)]
        dry_run: bool,

        /// Overwrite items that already exist canonically
        #[arg(long)]
        force: bool,

        /// Human-readable output
        #[arg(long)]
        pretty: bool,
    },

    /// Show unified diffs of what push would write
    ///
    /// Exits 2 when any diff is printed.
    Diff {
        #[command(flatten)]
        scope: Scope,
    },
}

impl Cli {
    /// Map global flags plus a scope onto engine options
    pub fn options(&self, scope: &Scope) -> SyncOptions {
        let mut options = SyncOptions::new(self.project_dir.clone())
            .with_targets(scope.targets.iter().copied())
            .with_types(scope.types.iter().copied());
        options.home_dir = self.home.clone();
        options
    }
}

fn parse_target(s: &str) -> Result<Target, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_item_type(s: &str) -> Result<ItemType, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_pull_source(s: &str) -> Result<PullSource, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_targets_and_type_aliases() {
        let cli = Cli::try_parse_from([
            "acsync", "check", "-t", "claude", "--target", "codex", "--type", "mcps",
        ])
        .unwrap();

        let Commands::Check { scope, pretty, .. } = &cli.command else {
            panic!("expected check");
        };
        assert_eq!(scope.targets, vec![Target::ClaudeCode, Target::Codex]);
        assert_eq!(scope.types, vec![ItemType::Mcp]);
        assert!(!pretty);
    }

    #[test]
    fn push_flags_map_onto_options() {
        let cli = Cli::try_parse_from([
            "acsync",
            "--project-dir",
            "/p",
            "--home",
            "/h",
            "push",
            "--type",
            "commands",
        ])
        .unwrap();
        let Commands::Push { scope, .. } = &cli.command else {
            panic!("expected push");
        };

        let options = cli.options(scope);

        assert_eq!(options.project_dir, PathBuf::from("/p"));
        assert_eq!(options.home_dir, Some(PathBuf::from("/h")));
        assert_eq!(options.types, vec![ItemType::Command]);
        assert!(options.targets.is_empty());
    }

    #[test]
    fn pull_requires_a_known_source() {
        assert!(Cli::try_parse_from(["acsync", "pull"]).is_err());
        assert!(Cli::try_parse_from(["acsync", "pull", "--source", "vim"]).is_err());

        let cli = Cli::try_parse_from(["acsync", "pull", "--source", "all"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Pull {
                source: PullSource::All,
                ..
            }
        ));
    }

    #[test]
    fn pretty_and_json_conflict() {
        assert!(Cli::try_parse_from(["acsync", "check", "--pretty", "--json"]).is_err());
    }
}
