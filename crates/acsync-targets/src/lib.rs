//! Target adapters for acsync
//!
//! Each supported coding assistant gets a [`TargetAdapter`] that knows where
//! the tool keeps its configuration and how to translate canonical items to
//! and from the tool's own formats:
//!
//! - **claude-code**: markdown with verbatim frontmatter, `~/.claude.json`
//! - **opencode**: trimmed frontmatter, `{env:VAR}` MCP placeholders
//! - **gemini**: TOML commands, `kind: local` agents
//! - **codex**: flat markdown prompts, TOML MCP tables
//!
//! The sync engine only talks to the trait; nothing outside this crate
//! depends on a concrete target's syntax.

pub mod adapter;
pub mod claude;
pub mod codex;
pub mod error;
pub mod frontmatter;
pub mod gemini;
pub mod mcp;
pub mod opencode;
pub mod paths;
pub mod support;
pub mod types;

/// Entry file of every skill folder
pub const SKILL_FILE: &str = "SKILL.md";

pub use adapter::{TargetAdapter, adapter_for};
pub use error::{Error, Result};
pub use paths::TargetPaths;
pub use types::{
    CanonicalItem, Capabilities, ItemType, McpServer, McpTransport, Metadata, RenderedFile,
    SupportFile, Target,
};
