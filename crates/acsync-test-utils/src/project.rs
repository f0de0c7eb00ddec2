//! [`TestProject`] builder for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary canonical project plus a temporary home directory that the
/// target adapters resolve their paths under.
///
/// # Example
///
/// ```rust,no_run
/// use acsync_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.command("plan", "Plan the work", "Break it down.");
/// project.assert_project_file_exists("configs/common/commands/plan.md");
/// ```
pub struct TestProject {
    project_dir: TempDir,
    home_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().unwrap(),
            home_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the canonical project
    pub fn root(&self) -> &Path {
        self.project_dir.path()
    }

    /// Fake home directory the targets live under
    pub fn home(&self) -> &Path {
        self.home_dir.path()
    }

    /// `configs/common` inside the project
    pub fn common(&self) -> PathBuf {
        self.root().join("configs").join("common")
    }

    /// Write `content` to `path` relative to the project root, creating parents.
    pub fn write(&self, path: &str, content: &str) -> PathBuf {
        write_file(&self.root().join(path), content)
    }

    /// Write `content` to `path` relative to the fake home, creating parents.
    pub fn write_home(&self, path: &str, content: &str) -> PathBuf {
        write_file(&self.home().join(path), content)
    }

    /// Seed a canonical command with a description.
    pub fn command(&self, name: &str, description: &str, body: &str) -> PathBuf {
        self.write(
            &format!("configs/common/commands/{name}.md"),
            &format!("---\ndescription: {description}\n---\n{body}\n"),
        )
    }

    /// Seed a canonical agent with a description and tool list.
    pub fn agent(&self, name: &str, description: &str, tools: &[&str], body: &str) -> PathBuf {
        let mut frontmatter = format!("---\nname: {name}\ndescription: {description}\n");
        if !tools.is_empty() {
            frontmatter.push_str("allowed-tools:\n");
            for tool in tools {
                frontmatter.push_str(&format!("- {tool}\n"));
            }
        }
        frontmatter.push_str("---\n");
        self.write(
            &format!("configs/common/agents/{name}.md"),
            &format!("{frontmatter}{body}\n"),
        )
    }

    /// Seed a canonical skill. `support` holds `(relative path, content)` pairs.
    pub fn skill(&self, name: &str, description: &str, body: &str, support: &[(&str, &str)]) -> PathBuf {
        let dir = format!("configs/common/skills/{name}");
        self.write(
            &format!("{dir}/SKILL.md"),
            &format!("---\nname: {name}\ndescription: {description}\n---\n{body}\n"),
        );
        for (path, content) in support {
            self.write(&format!("{dir}/{path}"), content);
        }
        self.root().join(dir)
    }

    /// Seed a canonical MCP server definition from raw JSON.
    pub fn mcp(&self, name: &str, json: &str) -> PathBuf {
        self.write(&format!("configs/common/mcp/{name}.json"), json)
    }

    /// Seed a stdio MCP server running `command`.
    pub fn stdio_mcp(&self, name: &str, command: &str) -> PathBuf {
        self.mcp(
            name,
            &format!("{{\n  \"name\": \"{name}\",\n  \"transport\": \"stdio\",\n  \"command\": \"{command}\"\n}}\n"),
        )
    }

    /// Seed `AGENTS.md` at the project root.
    pub fn instructions(&self, content: &str) -> PathBuf {
        self.write("AGENTS.md", content)
    }

    /// Read a project file, panicking with its path when unreadable.
    pub fn read(&self, path: &str) -> String {
        read_file(&self.root().join(path))
    }

    /// Read a home file, panicking with its path when unreadable.
    pub fn read_home(&self, path: &str) -> String {
        read_file(&self.home().join(path))
    }

    pub fn assert_project_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(full_path.exists(), "Expected file to exist: {}", full_path.display());
    }

    pub fn assert_home_file_exists(&self, path: &str) {
        let full_path = self.home().join(path);
        assert!(full_path.exists(), "Expected file to exist: {}", full_path.display());
    }

    pub fn assert_home_file_not_exists(&self, path: &str) {
        let full_path = self.home().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the home file at `path` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_home_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_home(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }

    /// Every file below the home directory, relative and sorted. Useful for
    /// asserting that nothing (temp siblings, backups) was left behind.
    pub fn home_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        collect(self.home(), self.home(), &mut files);
        files.sort();
        files
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, out);
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}
