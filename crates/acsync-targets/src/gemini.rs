//! Gemini CLI adapter
//!
//! Commands are TOML with a triple-quoted prompt that ends in an
//! arguments placeholder. Agents are markdown marked `kind: local`.

use crate::adapter::{TargetAdapter, parse_markdown};
use crate::error::{Error, Result};
use crate::frontmatter;
use crate::mcp::{self, MCP_SERVERS_KEY};
use crate::paths::TargetPaths;
use crate::types::{CanonicalItem, Capabilities, ItemType, McpServer, Metadata, RenderedFile, Target};
use serde::Deserialize;
use serde_json::json;

const ARGS_SUFFIX: &str = "\n\nUser arguments: {args}";

pub struct GeminiAdapter {
    paths: TargetPaths,
}

impl GeminiAdapter {
    pub fn new(paths: TargetPaths) -> Self {
        Self { paths }
    }
}

#[derive(Debug, Deserialize)]
struct CommandToml {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    prompt: String,
}

/// Escape text for a TOML multi-line basic string
fn escape_multiline(text: &str) -> String {
    text.replace('\\', "\\\\").replace("\"\"\"", "\"\"\\\"")
}

impl TargetAdapter for GeminiAdapter {
    fn target(&self) -> Target {
        Target::Gemini
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::without_skills()
    }

    fn paths(&self) -> &TargetPaths {
        &self.paths
    }

    fn render_command(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        let description = serde_json::to_string(item.meta_str("description").unwrap_or_default())?;
        let prompt = escape_multiline(item.content.trim());
        let content = format!("description = {description}\nprompt = \"\"\"\n{prompt}{ARGS_SUFFIX}\n\"\"\"\n");
        Ok(RenderedFile::new(self.paths.command_file(&item.name), content))
    }

    fn render_agent(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        let mut metadata = Metadata::new();
        for key in ["description", "allowed-tools"] {
            if let Some(value) = item.metadata.get(key) {
                metadata.insert(key.into(), value.clone());
            }
        }
        metadata.insert("kind".into(), json!("local"));
        Ok(RenderedFile::new(
            self.paths.agent_file(&item.name),
            frontmatter::stringify(&item.content, &metadata)?,
        ))
    }

    fn render_mcp_servers(&self, servers: &[McpServer], existing: Option<&str>) -> Result<String> {
        let entries = servers
            .iter()
            .filter(|s| s.is_enabled() && !s.is_disabled_for(Target::Gemini))
            .map(|s| (s.name.clone(), mcp::standard_entry(s)))
            .collect();
        mcp::merge_json(Target::Gemini, existing, MCP_SERVERS_KEY, entries)
    }

    fn parse_command(&self, name: &str, content: &str) -> Result<CanonicalItem> {
        let parsed: CommandToml = toml::from_str(content).map_err(|e| Error::Parse {
            target: Target::Gemini,
            item_type: ItemType::Command,
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let prompt = parsed.prompt.trim_end();
        let body = prompt.strip_suffix(ARGS_SUFFIX).unwrap_or(prompt).trim();

        let mut metadata = Metadata::new();
        if let Some(description) = parsed.description.filter(|d| !d.is_empty()) {
            metadata.insert("description".into(), json!(description));
        }
        Ok(CanonicalItem::new(name, format!("{body}\n")).with_metadata(metadata))
    }

    fn parse_agent(&self, name: &str, content: &str) -> Result<CanonicalItem> {
        let mut item = parse_markdown(Target::Gemini, ItemType::Agent, name, content)?;
        item.metadata.shift_remove("kind");
        Ok(item)
    }

    fn command_name_from_file(&self, file_name: &str) -> Option<String> {
        file_name.strip_suffix(".toml").map(str::to_string)
    }
}
