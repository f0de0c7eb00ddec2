//! On-disk locations for each target, rooted at an overridable home directory

use crate::types::Target;
use std::path::{Path, PathBuf};

/// Resolves every path a target reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    target: Target,
    home: PathBuf,
}

impl TargetPaths {
    pub fn new(target: Target, home: impl Into<PathBuf>) -> Self {
        Self {
            target,
            home: home.into(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Root configuration directory of the tool
    pub fn base_dir(&self) -> PathBuf {
        match self.target {
            Target::ClaudeCode => self.home.join(".claude"),
            Target::OpenCode => self.home.join(".config").join("opencode"),
            Target::Gemini => self.home.join(".gemini"),
            Target::Codex => self.home.join(".codex"),
        }
    }

    pub fn commands_dir(&self) -> PathBuf {
        match self.target {
            Target::ClaudeCode | Target::Gemini => self.base_dir().join("commands"),
            Target::OpenCode => self.base_dir().join("command"),
            Target::Codex => self.base_dir().join("prompts"),
        }
    }

    pub fn command_file(&self, name: &str) -> PathBuf {
        let ext = match self.target {
            Target::Gemini => "toml",
            _ => "md",
        };
        self.commands_dir().join(format!("{name}.{ext}"))
    }

    pub fn agents_dir(&self) -> PathBuf {
        match self.target {
            // Codex keeps agents next to prompts, distinguished by prefix
            Target::Codex => self.base_dir().join("prompts"),
            _ => self.base_dir().join("agents"),
        }
    }

    pub fn agent_file(&self, name: &str) -> PathBuf {
        match self.target {
            Target::Codex => self.agents_dir().join(format!("agent-{name}.md")),
            _ => self.agents_dir().join(format!("{name}.md")),
        }
    }

    pub fn mcp_config(&self) -> PathBuf {
        match self.target {
            Target::ClaudeCode => self.home.join(".claude.json"),
            Target::OpenCode => self.base_dir().join("opencode.json"),
            Target::Gemini => self.base_dir().join("settings.json"),
            Target::Codex => self.base_dir().join("config.toml"),
        }
    }

    pub fn instructions_file(&self) -> PathBuf {
        match self.target {
            Target::ClaudeCode => self.base_dir().join("CLAUDE.md"),
            _ => self.base_dir().join("AGENTS.md"),
        }
    }

    /// `None` for targets without skill support
    pub fn skills_dir(&self) -> Option<PathBuf> {
        match self.target {
            Target::ClaudeCode => Some(self.base_dir().join("skills")),
            Target::OpenCode => Some(self.base_dir().join("skill")),
            Target::Gemini | Target::Codex => None,
        }
    }

    pub fn skill_dir(&self, name: &str) -> Option<PathBuf> {
        self.skills_dir().map(|dir| dir.join(name))
    }

    pub fn skill_file(&self, name: &str) -> Option<PathBuf> {
        self.skill_dir(name).map(|dir| dir.join(crate::SKILL_FILE))
    }
}
