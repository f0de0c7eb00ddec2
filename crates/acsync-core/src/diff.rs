//! Git-style unified diffs for display

use similar::TextDiff;

const CONTEXT_LINES: usize = 3;

/// Unified diff from `old` to `new`, or `None` when they are identical.
pub fn unified_diff(old: &str, new: &str, path: &str) -> Option<String> {
    if old == new {
        return None;
    }
    let diff = TextDiff::from_lines(old, new);
    let rendered = diff
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string();
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_text_has_no_diff() {
        assert_eq!(unified_diff("same\n", "same\n", "x.md"), None);
    }

    #[test]
    fn changed_line_gets_headers_and_hunk() {
        let diff = unified_diff("one\ntwo\nthree\n", "one\n2\nthree\n", ".claude/commands/plan.md").unwrap();

        assert!(diff.starts_with("--- a/.claude/commands/plan.md\n+++ b/.claude/commands/plan.md\n"));
        assert!(diff.contains("@@ -1,3 +1,3 @@"));
        assert!(diff.contains("-two\n"));
        assert!(diff.contains("+2\n"));
    }

    #[test]
    fn creation_diffs_against_empty() {
        let diff = unified_diff("", "new file\n", "a.md").unwrap();
        assert!(diff.contains("+new file"));
    }

    #[test]
    fn far_apart_changes_split_into_hunks() {
        let old: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let new = old.replace("line 2\n", "line two\n").replace("line 19\n", "line nineteen\n");

        let diff = unified_diff(&old, &new, "f").unwrap();

        assert_eq!(diff.matches("@@ ").count(), 2);
    }
}
