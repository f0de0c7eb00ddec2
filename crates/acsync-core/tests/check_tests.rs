//! Tests for check and diff: planning without writing

use acsync_core::{
    ItemType, McpWarningAction, OperationKind, Severity, SyncEngine, SyncOptions, Target,
};
use acsync_test_utils::TestProject;
use pretty_assertions::assert_eq;

fn engine(project: &TestProject) -> SyncEngine {
    SyncEngine::new(project.root(), project.home()).expect("Should create engine")
}

fn options(project: &TestProject) -> SyncOptions {
    SyncOptions::new(project.root()).with_home(project.home())
}

mod check {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_project_has_no_drift() {
        let project = TestProject::new();

        let report = engine(&project).check(&options(&project)).unwrap();

        assert!(!report.has_drift);
        assert_eq!(
            report.diffs.iter().map(|d| d.target).collect::<Vec<_>>(),
            Target::ALL.to_vec()
        );
        assert_eq!(report.summary().total(), 0);
    }

    #[test]
    fn test_new_command_is_created_at_every_target() {
        let project = TestProject::new();
        project.command("plan", "Plan the work", "Break it down.");

        let report = engine(&project).check(&options(&project)).unwrap();

        assert!(report.has_drift);
        for diff in &report.diffs {
            let creates: Vec<_> = diff.operations_of(OperationKind::Create).collect();
            assert_eq!(creates.len(), 1, "target {}", diff.target);
            assert_eq!(creates[0].item_type, ItemType::Command);
            assert_eq!(creates[0].name, "plan");
            assert_eq!(creates[0].reason, "Item not in target");
        }
    }

    #[test]
    fn test_check_writes_nothing() {
        let project = TestProject::new();
        project.command("plan", "Plan the work", "Break it down.");
        project.instructions("# Rules\n");

        engine(&project).check(&options(&project)).unwrap();

        assert!(project.home_files().is_empty());
        assert!(!project.root().join(".acsync/manifest.json").exists());
    }

    #[test]
    fn test_target_selection_limits_plans() {
        let project = TestProject::new();
        project.command("plan", "Plan", "Body");

        let report = engine(&project)
            .check(&options(&project).with_targets([Target::Gemini]))
            .unwrap();

        assert_eq!(report.diffs.len(), 1);
        assert_eq!(report.diffs[0].target, Target::Gemini);
    }

    #[test]
    fn test_type_selection_limits_operations() {
        let project = TestProject::new();
        project.command("plan", "Plan", "Body");
        project.agent("reviewer", "Reviews code", &["Read"], "Review it.");

        let report = engine(&project)
            .check(&options(&project).with_types([ItemType::Agent]))
            .unwrap();

        for diff in &report.diffs {
            assert!(diff.operations.iter().all(|op| op.item_type == ItemType::Agent));
            assert_eq!(diff.summary.create, 1);
        }
    }

    #[test]
    fn test_skills_only_planned_where_supported() {
        let project = TestProject::new();
        project.skill("pdf", "Work with PDFs", "Use the scripts.", &[("scripts/run.sh", "echo")]);

        let report = engine(&project).check(&options(&project)).unwrap();

        assert_eq!(report.diff_for(Target::ClaudeCode).unwrap().summary.create, 1);
        assert_eq!(report.diff_for(Target::OpenCode).unwrap().summary.create, 1);
        assert_eq!(report.diff_for(Target::Gemini).unwrap().summary.total(), 0);
        assert_eq!(report.diff_for(Target::Codex).unwrap().summary.total(), 0);
    }

    #[test]
    fn test_broken_item_is_reported_and_others_still_planned() {
        let project = TestProject::new();
        project.command("good", "Fine", "Body");
        project.write("configs/common/commands/bad.md", "---\ndescription: [unclosed\n---\nBody\n");

        let report = engine(&project).check(&options(&project)).unwrap();

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].name, "bad");
        assert_eq!(report.issues[0].severity, Severity::Warning);
        let claude = report.diff_for(Target::ClaudeCode).unwrap();
        assert_eq!(claude.operations.len(), 1);
        assert_eq!(claude.operations[0].name, "good");
    }

    #[test]
    fn test_hand_edited_target_is_an_update() {
        let project = TestProject::new();
        project.command("plan", "Plan", "Body");
        engine(&project).push(&options(&project)).unwrap();
        project.write_home(".claude/commands/plan.md", "edited by hand\n");

        let report = engine(&project).check(&options(&project)).unwrap();
        let claude = report.diff_for(Target::ClaudeCode).unwrap();

        assert_eq!(claude.summary.update, 1);
        assert_eq!(
            claude.operations[0].reason,
            "Item content changed in source (target modified outside acsync)"
        );
        assert!(!report.diff_for(Target::OpenCode).unwrap().has_drift());
    }
}

mod stale {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removed_command_is_a_delete_but_not_drift() {
        let project = TestProject::new();
        project.command("keep", "Keep", "Body");
        let dropped = project.command("drop", "Drop", "Body");
        engine(&project).push(&options(&project)).unwrap();
        std::fs::remove_file(dropped).unwrap();

        let report = engine(&project).check(&options(&project)).unwrap();

        assert!(!report.has_drift);
        assert!(report.has_deletes());
        for diff in &report.diffs {
            let deletes: Vec<_> = diff.operations_of(OperationKind::Delete).collect();
            assert_eq!(deletes.len(), 1, "target {}", diff.target);
            assert_eq!(deletes[0].name, "drop");
            assert_eq!(deletes[0].reason, "Item not in canonical source (stale)");
        }
    }

    #[test]
    fn test_empty_canonical_type_never_deletes() {
        let project = TestProject::new();
        project.command("plan", "Plan", "Body");
        project.write_home(".claude/agents/manual.md", "hand written\n");
        project.write_home(".codex/prompts/agent-manual.md", "hand written\n");

        let report = engine(&project).check(&options(&project)).unwrap();

        for diff in &report.diffs {
            assert_eq!(
                diff.operations_of(OperationKind::Delete)
                    .filter(|op| op.item_type == ItemType::Agent)
                    .count(),
                0
            );
        }
    }

    #[test]
    fn test_excluded_entries_are_never_stale() {
        let project = TestProject::new();
        project.command("plan", "Plan", "Body");
        project.write_home(".claude/commands/gsd-progress.md", "external\n");
        project.write_home(".claude/commands/other.md", "stale\n");

        let report = engine(&project).check(&options(&project)).unwrap();
        let deletes: Vec<_> = report
            .diff_for(Target::ClaudeCode)
            .unwrap()
            .operations_of(OperationKind::Delete)
            .map(|op| op.name.clone())
            .collect();

        assert_eq!(deletes, vec!["other".to_string()]);
    }

    #[test]
    fn test_unmanaged_mcp_servers_produce_a_warning() {
        let project = TestProject::new();
        project.stdio_mcp("context7", "npx");
        project.write_home(".claude.json", r#"{"mcpServers": {"manual": {"command": "x"}}}"#);

        let report = engine(&project).check(&options(&project)).unwrap();
        let warning = report
            .diff_for(Target::ClaudeCode)
            .unwrap()
            .mcp_warning
            .clone()
            .expect("Should warn about the manual server");

        assert_eq!(warning.server_names, vec!["manual".to_string()]);
        assert_eq!(warning.action, McpWarningAction::Remove);
    }
}

mod diff {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diff_shows_new_file_against_empty() {
        let project = TestProject::new();
        project.command("plan", "Plan", "Break it down.");

        let diffs = engine(&project)
            .diff(&options(&project).with_targets([Target::ClaudeCode]))
            .unwrap();

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].name, "plan");
        assert!(diffs[0].diff.contains("+++ b/.claude/commands/plan.md"));
        assert!(diffs[0].diff.contains("+Break it down."));
    }

    #[test]
    fn test_diff_is_empty_after_push() {
        let project = TestProject::new();
        project.command("plan", "Plan", "Body");
        project.stdio_mcp("context7", "npx");
        engine(&project).push(&options(&project)).unwrap();

        let diffs = engine(&project).diff(&options(&project)).unwrap();

        assert!(diffs.is_empty());
    }

    #[test]
    fn test_skill_diff_includes_support_files() {
        let project = TestProject::new();
        project.skill("pdf", "PDFs", "Use scripts.", &[("scripts/run.sh", "echo hi\n")]);

        let diffs = engine(&project)
            .diff(&options(&project).with_targets([Target::ClaudeCode]))
            .unwrap();

        let paths: Vec<_> = diffs
            .iter()
            .map(|d| d.path.strip_prefix(project.home()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            paths,
            vec![
                std::path::PathBuf::from(".claude/skills/pdf/SKILL.md"),
                std::path::PathBuf::from(".claude/skills/pdf/scripts/run.sh"),
            ]
        );
    }
}
