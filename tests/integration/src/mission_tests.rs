//! Mission-based Integration Tests
//!
//! End-to-end scenarios across crates: a canonical project is pushed to a
//! fake home, edited on either side, and pulled back. Each mission module
//! covers one user-visible workflow.

use acsync_core::{
    ItemType, Manifest, OperationKind, PullSource, SyncEngine, SyncOptions, Target,
};
use acsync_targets::adapter_for;
use acsync_test_utils::TestProject;
use std::fs;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn engine(project: &TestProject) -> SyncEngine {
    SyncEngine::new(project.root(), project.home()).expect("Should create engine")
}

fn options(project: &TestProject) -> SyncOptions {
    SyncOptions::new(project.root()).with_home(project.home())
}

/// A project with one of everything
fn full_project() -> TestProject {
    let project = TestProject::new();
    project.command("plan", "Plan the work", "Break the task into steps.");
    project.command("ship", "Ship it", "Run the release checklist.");
    project.agent("reviewer", "Reviews code", &["Read", "Grep"], "Review for bugs.");
    project.skill(
        "pdf",
        "Work with PDFs",
        "Use the bundled scripts.",
        &[("scripts/extract.py", "print('extract')\n"), ("reference.md", "# Reference\n")],
    );
    project.stdio_mcp("context7", "npx");
    project.mcp(
        "docs",
        r#"{"name": "docs", "transport": "http", "url": "https://docs.example.com/mcp",
            "headers": {"Authorization": "Bearer ${DOCS_TOKEN}"}}"#,
    );
    project.instructions("# Project rules\n\nKeep changes small.\n");
    project.write("configs/common/instructions/codex.md", "Codex: prefer apply_patch.\n");
    project
}

// =============================================================================
// M1: First push installs everything
// =============================================================================

mod m1_first_push {
    use super::*;

    #[test]
    fn m1_1_every_target_receives_its_items() {
        let project = full_project();

        let report = engine(&project).push(&options(&project)).unwrap();

        assert!(report.success());
        for target in Target::ALL {
            let adapter = adapter_for(target, project.home());
            let paths = adapter.paths();
            assert!(paths.command_file("plan").is_file(), "{target} command");
            assert!(paths.agent_file("reviewer").is_file(), "{target} agent");
            assert!(paths.instructions_file().is_file(), "{target} instructions");
            if let Some(skill) = paths.skill_file("pdf") {
                assert!(skill.is_file(), "{target} skill");
            }
        }
    }

    #[test]
    fn m1_2_codex_gets_http_servers_and_addendum() {
        let project = full_project();

        engine(&project).push(&options(&project)).unwrap();

        let config: toml::Value =
            toml::from_str(&project.read_home(".codex/config.toml")).unwrap();
        let docs = &config["mcp_servers"]["docs"];
        assert_eq!(docs["url"].as_str(), Some("https://docs.example.com/mcp"));
        assert_eq!(docs["bearer_token_env_var"].as_str(), Some("DOCS_TOKEN"));
        assert!(config["mcp_servers"].get("context7").is_none());

        let agents_md = project.read_home(".codex/AGENTS.md");
        assert!(agents_md.starts_with("# Project rules"));
        assert!(agents_md.contains("Codex: prefer apply_patch."));
        assert!(!project.read_home(".claude/CLAUDE.md").contains("apply_patch"));
    }

    #[test]
    fn m1_3_opencode_uses_env_placeholder_syntax() {
        let project = full_project();

        engine(&project).push(&options(&project)).unwrap();

        let config: serde_json::Value =
            serde_json::from_str(&project.read_home(".config/opencode/opencode.json")).unwrap();
        assert_eq!(config["mcp"]["context7"]["type"], "local");
        assert_eq!(config["mcp"]["docs"]["type"], "remote");
        assert_eq!(
            config["mcp"]["docs"]["headers"]["Authorization"],
            "Bearer {env:DOCS_TOKEN}"
        );
    }

    #[test]
    fn m1_4_manifest_covers_every_item_and_target() {
        let project = full_project();

        engine(&project).push(&options(&project)).unwrap();

        let manifest = Manifest::load(&Manifest::path_for(project.root()));
        for target in Target::ALL {
            assert!(manifest.lookup(ItemType::Command, "plan", target).is_some());
            assert!(manifest.lookup(ItemType::Instruction, "instructions", target).is_some());
        }
        assert!(manifest.lookup(ItemType::Skill, "pdf", Target::OpenCode).is_some());
        assert!(manifest.lookup(ItemType::Skill, "pdf", Target::Gemini).is_none());
        assert!(manifest.lookup(ItemType::Mcp, "docs", Target::Codex).is_some());
        assert!(manifest.lookup(ItemType::Mcp, "context7", Target::Codex).is_none());
    }
}

// =============================================================================
// M2: Steady state and drift
// =============================================================================

mod m2_drift {
    use super::*;

    #[test]
    fn m2_1_push_is_idempotent() {
        let project = full_project();
        engine(&project).push(&options(&project)).unwrap();
        let files = project.home_files();

        let check = engine(&project).check(&options(&project)).unwrap();
        let again = engine(&project).push(&options(&project)).unwrap();

        assert!(!check.has_drift);
        assert_eq!(check.summary().create + check.summary().update, 0);
        assert_eq!(again.written, 0);
        assert_eq!(project.home_files(), files);
    }

    #[test]
    fn m2_2_canonical_edit_updates_every_target() {
        let project = full_project();
        engine(&project).push(&options(&project)).unwrap();
        project.command("plan", "Plan the work", "New steps.");

        let check = engine(&project).check(&options(&project)).unwrap();
        for diff in &check.diffs {
            let updates: Vec<_> = diff.operations_of(OperationKind::Update).collect();
            assert_eq!(updates.len(), 1, "{}", diff.target);
            assert_eq!(
                updates[0].reason,
                "Item content changed in source (target matches last sync)"
            );
        }

        engine(&project).push(&options(&project)).unwrap();
        project.assert_home_file_contains(".gemini/commands/plan.toml", "New steps.");
        project.assert_home_file_contains(".codex/prompts/plan.md", "New steps.");
    }

    #[test]
    fn m2_3_support_file_change_is_skill_drift() {
        let project = full_project();
        engine(&project).push(&options(&project)).unwrap();
        project.write("configs/common/skills/pdf/reference.md", "# Reference v2\n");

        let check = engine(&project).check(&options(&project)).unwrap();

        let claude = check.diff_for(Target::ClaudeCode).unwrap();
        let skill_ops: Vec<_> = claude
            .operations_of(OperationKind::Update)
            .filter(|op| op.item_type == ItemType::Skill)
            .collect();
        assert_eq!(skill_ops.len(), 1);
    }

    #[test]
    fn m2_4_user_settings_in_shared_config_survive() {
        let project = full_project();
        project.write_home(".gemini/settings.json", "{\n  \"theme\": \"Dracula\"\n}\n");

        engine(&project).push(&options(&project)).unwrap();

        let settings: serde_json::Value =
            serde_json::from_str(&project.read_home(".gemini/settings.json")).unwrap();
        assert_eq!(settings["theme"], "Dracula");
        assert_eq!(settings["mcpServers"]["context7"]["command"], "npx");
        assert_eq!(settings["mcpServers"]["docs"]["url"], "https://docs.example.com/mcp");
    }
}

// =============================================================================
// M3: Failure isolation
// =============================================================================

mod m3_failures {
    use super::*;

    #[test]
    fn m3_1_blocked_target_rolls_back_alone() {
        let project = full_project();
        engine(&project).push(&options(&project)).unwrap();
        let manifest_before = fs::read_to_string(Manifest::path_for(project.root())).unwrap();
        let opencode_plan = project.read_home(".config/opencode/command/plan.md");

        project.command("plan", "Plan the work", "Changed.");
        project.command("zzz", "Last", "Body");
        fs::create_dir_all(project.home().join(".gemini/commands/zzz.toml")).unwrap();

        let report = engine(&project).push(&options(&project)).unwrap();

        assert_eq!(report.failed, 1);
        let gemini = report.targets.iter().find(|t| t.target == Target::Gemini).unwrap();
        assert!(!gemini.success);
        assert!(!project.read_home(".gemini/commands/plan.toml").contains("Changed."));
        assert!(project.read_home(".claude/commands/plan.md").contains("Changed."));
        assert_ne!(project.read_home(".config/opencode/command/plan.md"), opencode_plan);
        assert_eq!(
            fs::read_to_string(Manifest::path_for(project.root())).unwrap(),
            manifest_before
        );
    }

    #[test]
    fn m3_2_corrupt_manifest_is_rebuilt() {
        let project = full_project();
        engine(&project).push(&options(&project)).unwrap();
        fs::write(Manifest::path_for(project.root()), "not valid json").unwrap();

        let check = engine(&project).check(&options(&project)).unwrap();
        assert!(!check.has_drift);

        project.command("plan", "Plan the work", "Edited.");
        let report = engine(&project).push(&options(&project)).unwrap();
        assert!(report.manifest_saved);
        let manifest = Manifest::load(&Manifest::path_for(project.root()));
        assert!(manifest.lookup(ItemType::Command, "plan", Target::ClaudeCode).is_some());
    }
}

// =============================================================================
// M4: Pull round trip
// =============================================================================

mod m4_pull {
    use super::*;

    #[test]
    fn m4_1_pushed_items_pull_back_into_a_fresh_project() {
        let source = full_project();
        engine(&source).push(&options(&source)).unwrap();

        // A second project sharing the same home
        let fresh = tempfile::TempDir::new().unwrap();
        let engine = SyncEngine::new(fresh.path(), source.home()).unwrap();
        let opts = SyncOptions::new(fresh.path()).with_home(source.home());

        let report = engine.pull(PullSource::All, &opts).unwrap();

        assert!(report.success());
        for item in &report.items {
            assert_eq!(item.source, Some(Target::ClaudeCode), "{} {}", item.item_type, item.name);
        }
        assert_eq!(
            fs::read_to_string(fresh.path().join("configs/common/commands/plan.md")).unwrap(),
            source.read("configs/common/commands/plan.md")
        );
        assert!(fresh.path().join("configs/common/skills/pdf/scripts/extract.py").is_file());
    }

    #[test]
    fn m4_2_pull_then_push_changes_nothing_for_the_source() {
        let project = TestProject::new();
        project.write_home(
            ".claude/commands/hello.md",
            "---\ndescription: Greet\nargument-hint: name\n---\nSay hello.\n",
        );

        engine(&project)
            .pull(PullSource::Target(Target::ClaudeCode), &options(&project))
            .unwrap();
        let check = engine(&project)
            .check(&options(&project).with_targets([Target::ClaudeCode]))
            .unwrap();

        assert!(!check.has_drift);
    }
}
