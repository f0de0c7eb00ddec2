//! Domain types shared by adapters and the sync engine

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Ordered frontmatter metadata
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A supported destination tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Target {
    #[serde(rename = "claude-code", alias = "claude")]
    ClaudeCode,
    #[serde(rename = "opencode")]
    OpenCode,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "codex")]
    Codex,
}

impl Target {
    /// All targets in priority order. Pull-All resolves duplicates in this order
    /// and push processes targets in it.
    pub const ALL: [Target; 4] = [
        Target::ClaudeCode,
        Target::OpenCode,
        Target::Gemini,
        Target::Codex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Target::ClaudeCode => "claude-code",
            Target::OpenCode => "opencode",
            Target::Gemini => "gemini",
            Target::Codex => "codex",
        }
    }

    /// User-facing short name
    pub fn display_name(self) -> &'static str {
        match self {
            Target::ClaudeCode => "claude",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "claude-code" => Ok(Target::ClaudeCode),
            "opencode" => Ok(Target::OpenCode),
            "gemini" => Ok(Target::Gemini),
            "codex" => Ok(Target::Codex),
            _ => Err(Error::UnknownTarget {
                name: s.to_string(),
            }),
        }
    }
}

/// Kind of configuration item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Command,
    Agent,
    Mcp,
    Instruction,
    Skill,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        ItemType::Command,
        ItemType::Agent,
        ItemType::Mcp,
        ItemType::Instruction,
        ItemType::Skill,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Command => "command",
            ItemType::Agent => "agent",
            ItemType::Mcp => "mcp",
            ItemType::Instruction => "instruction",
            ItemType::Skill => "skill",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "command" | "commands" => Ok(ItemType::Command),
            "agent" | "agents" => Ok(ItemType::Agent),
            "mcp" | "mcps" => Ok(ItemType::Mcp),
            "instruction" | "instructions" => Ok(ItemType::Instruction),
            "skill" | "skills" => Ok(ItemType::Skill),
            _ => Err(Error::UnknownItemType {
                name: s.to_string(),
            }),
        }
    }
}

/// Which item types a target can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub commands: bool,
    pub agents: bool,
    pub mcp: bool,
    pub instructions: bool,
    pub skills: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            commands: true,
            agents: true,
            mcp: true,
            instructions: true,
            skills: true,
        }
    }

    pub fn without_skills() -> Self {
        Self {
            skills: false,
            ..Self::all()
        }
    }

    pub fn supports(&self, item_type: ItemType) -> bool {
        match item_type {
            ItemType::Command => self.commands,
            ItemType::Agent => self.agents,
            ItemType::Mcp => self.mcp,
            ItemType::Instruction => self.instructions,
            ItemType::Skill => self.skills,
        }
    }
}

/// A file shipped alongside a skill's `SKILL.md`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFile {
    /// Path relative to the skill directory
    pub relative_path: PathBuf,
    pub content: Vec<u8>,
}

/// Source-of-truth representation of a command, agent or skill
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalItem {
    pub name: String,
    /// Markdown body without frontmatter
    pub content: String,
    pub metadata: Metadata,
    pub support_files: Vec<SupportFile>,
}

impl CanonicalItem {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_support_files(mut self, files: Vec<SupportFile>) -> Self {
        self.support_files = files;
        self
    }

    /// A string metadata value, if present
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    #[default]
    Stdio,
    Http,
}

/// Canonical MCP server definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub transport: McpTransport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Bare environment variable names the server needs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_for: Vec<Target>,
}

impl McpServer {
    pub fn stdio(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: McpTransport::Stdio,
            command: Some(command.into()),
            ..Self::default()
        }
    }

    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: McpTransport::Http,
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// `false` only when explicitly disabled
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    pub fn is_disabled_for(&self, target: Target) -> bool {
        self.disabled_for.contains(&target)
    }
}

/// A rendered target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
}

impl RenderedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
