//! Integration tests for the acsync binary.
//!
//! These tests exercise the compiled binary using assert_cmd against a
//! temporary project and a temporary home.

use acsync_test_utils::TestProject;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// An `acsync` command pointed at the project and its fake home
fn acsync(project: &TestProject) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("acsync"));
    cmd.arg("--project-dir")
        .arg(project.root())
        .arg("--home")
        .arg(project.home())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_commands() {
    Command::new(assert_cmd::cargo::cargo_bin!("acsync"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("diff"));
}

#[test]
fn test_unknown_target_is_rejected() {
    let project = TestProject::new();
    acsync(&project)
        .args(["check", "-t", "vim"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown target"));
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_exit_codes_follow_drift() {
    let project = TestProject::new();
    acsync(&project).arg("check").assert().code(0);

    project.command("plan", "Plan", "Body");
    let output = acsync(&project).arg("check").assert().code(2).get_output().clone();

    let report = stdout_json(&output);
    assert_eq!(report["hasDrift"], true);
    assert_eq!(report["diffs"][0]["target"], "claude-code");
    assert_eq!(report["diffs"][0]["operations"][0]["type"], "create");
    assert_eq!(report["diffs"][0]["operations"][0]["itemType"], "command");
}

#[test]
fn test_check_pretty_output() {
    let project = TestProject::new();
    project.command("plan", "Plan", "Body");

    acsync(&project)
        .args(["check", "--pretty", "-t", "claude"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("claude-code"))
        .stdout(predicate::str::contains("+ command plan"))
        .stdout(predicate::str::contains("acsync push"));
}

#[test]
fn test_home_can_come_from_environment() {
    let project = TestProject::new();
    project.command("plan", "Plan", "Body");

    Command::new(assert_cmd::cargo::cargo_bin!("acsync"))
        .arg("--project-dir")
        .arg(project.root())
        .env("ACSYNC_HOME", project.home())
        .args(["push", "-t", "claude"])
        .assert()
        .success();

    project.assert_home_file_exists(".claude/commands/plan.md");
}

// ============================================================================
// Push
// ============================================================================

#[test]
fn test_push_then_check_is_clean() {
    let project = TestProject::new();
    project.command("plan", "Plan", "Body");
    project.stdio_mcp("context7", "npx");

    let output = acsync(&project).arg("push").assert().success().get_output().clone();
    let report = stdout_json(&output);
    assert_eq!(report["manifestSaved"], true);
    assert_eq!(report["failed"], 0);

    acsync(&project).arg("check").assert().code(0);
    project.assert_project_file_exists(".acsync/manifest.json");
}

#[test]
fn test_push_dry_run_writes_nothing() {
    let project = TestProject::new();
    project.command("plan", "Plan", "Body");

    acsync(&project)
        .args(["push", "--dry-run", "--pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(project.home_files().is_empty());
}

#[test]
fn test_push_failure_exits_one() {
    let project = TestProject::new();
    project.command("plan", "Plan", "Body");
    std::fs::create_dir_all(project.home().join(".claude/commands/plan.md")).unwrap();

    let output = acsync(&project)
        .args(["push", "--type", "commands"])
        .assert()
        .code(1)
        .get_output()
        .clone();

    let report = stdout_json(&output);
    assert_eq!(report["rolledBack"], true);
    assert_eq!(report["targets"][0]["success"], false);
    assert_eq!(report["targets"][1]["success"], true);
}

#[test]
fn test_push_exits_one_when_manifest_cannot_be_saved() {
    let project = TestProject::new();
    project.command("plan", "Plan", "Body");
    project.write(".acsync", "not a directory");

    let output = acsync(&project)
        .args(["push", "-t", "claude"])
        .assert()
        .code(1)
        .get_output()
        .clone();

    let report = stdout_json(&output);
    assert_eq!(report["manifestSaved"], false);
    assert!(report["manifestError"].is_string());
    assert_eq!(report["rolledBack"], false);
}

#[test]
fn test_push_delete_removes_stale_items() {
    let project = TestProject::new();
    project.command("keep", "Keep", "Body");
    project.write_home(".claude/commands/old.md", "stale\n");

    acsync(&project).args(["push", "-t", "claude"]).assert().success();
    project.assert_home_file_exists(".claude/commands/old.md");

    acsync(&project)
        .args(["push", "-t", "claude", "--delete"])
        .assert()
        .success();
    project.assert_home_file_not_exists(".claude/commands/old.md");
}

// ============================================================================
// Pull
// ============================================================================

#[test]
fn test_pull_from_claude() {
    let project = TestProject::new();
    project.write_home(".claude/commands/hello.md", "---\ndescription: Hi\n---\nHello\n");

    let output = acsync(&project)
        .args(["pull", "--source", "claude"])
        .assert()
        .success()
        .get_output()
        .clone();

    let report = stdout_json(&output);
    assert_eq!(report["source"], "claude-code");
    assert_eq!(report["pulled"], 1);
    assert_eq!(report["items"][0]["action"], "create");
    project.assert_project_file_exists("configs/common/commands/hello.md");
}

#[test]
fn test_pull_all_pretty() {
    let project = TestProject::new();
    project.write_home(".gemini/commands/hello.toml", "description = \"Hi\"\nprompt = \"\"\"\nHello\n\"\"\"\n");

    acsync(&project)
        .args(["pull", "--source", "all", "--pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pulled from all"))
        .stdout(predicate::str::contains("1 pulled, 0 skipped"));

    assert!(project.read("configs/common/commands/hello.md").contains("Hello"));
}

// ============================================================================
// Diff
// ============================================================================

#[test]
fn test_diff_exit_codes() {
    let project = TestProject::new();
    project.command("plan", "Plan", "Break it down.");

    acsync(&project)
        .args(["diff", "-t", "claude"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("+++ b/.claude/commands/plan.md"))
        .stdout(predicate::str::contains("+Break it down."));

    acsync(&project).args(["push", "-t", "claude"]).assert().success();
    acsync(&project).args(["diff", "-t", "claude"]).assert().code(0);
}
