//! Codex adapter
//!
//! Commands and agents are flat markdown without frontmatter, sharing the
//! prompts directory. Agent files carry an `agent-` prefix. MCP servers are
//! TOML tables in `config.toml`, HTTP only.

use crate::adapter::TargetAdapter;
use crate::error::{Error, Result};
use crate::mcp;
use crate::paths::TargetPaths;
use crate::types::{CanonicalItem, Capabilities, ItemType, McpServer, McpTransport, Metadata, RenderedFile, Target};
use serde_json::{Value, json};

const AGENT_PREFIX: &str = "agent-";
const ROLE_PREFIX: &str = "**Role**: ";
const TOOLS_PREFIX: &str = "**Allowed Tools**: ";

pub struct CodexAdapter {
    paths: TargetPaths,
}

impl CodexAdapter {
    pub fn new(paths: TargetPaths) -> Self {
        Self { paths }
    }

    fn renders(server: &McpServer) -> bool {
        server.transport == McpTransport::Http
            && server.is_enabled()
            && !server.is_disabled_for(Target::Codex)
    }
}

fn tools_line(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(tools)) => tools
            .iter()
            .map(|t| t.as_str().map(str::to_string).unwrap_or_else(|| t.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn parse_error(item_type: ItemType, name: &str, message: &str) -> Error {
    Error::Parse {
        target: Target::Codex,
        item_type,
        name: name.to_string(),
        message: message.to_string(),
    }
}

/// Split `content` after its heading line, dropping the blank line that follows.
fn after_heading<'a>(content: &'a str, heading: &str) -> Option<&'a str> {
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    if first.trim_end() != heading {
        return None;
    }
    Some(rest.strip_prefix('\n').unwrap_or(rest))
}

/// Take one paragraph from the front of `text`
fn take_paragraph(text: &str) -> (&str, &str) {
    text.split_once("\n\n").unwrap_or((text.trim_end_matches('\n'), ""))
}

fn body_text(rest: &str) -> String {
    let body = rest.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!("{body}\n")
    }
}

impl TargetAdapter for CodexAdapter {
    fn target(&self) -> Target {
        Target::Codex
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::without_skills()
    }

    fn paths(&self) -> &TargetPaths {
        &self.paths
    }

    fn render_command(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        let description = item.meta_str("description").unwrap_or_default();
        let content = format!(
            "# /{}\n\n{}\n\n{}\n",
            item.name,
            description,
            item.content.trim()
        );
        Ok(RenderedFile::new(self.paths.command_file(&item.name), content))
    }

    fn render_agent(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        let description = item.meta_str("description").unwrap_or_default();
        let mut content = format!("# Agent: {}\n\n{ROLE_PREFIX}{description}\n\n", item.name);
        let tools = tools_line(item.metadata.get("allowed-tools"));
        if !tools.is_empty() {
            content.push_str(&format!("{TOOLS_PREFIX}{tools}\n\n"));
        }
        content.push_str(item.content.trim());
        content.push('\n');
        Ok(RenderedFile::new(self.paths.agent_file(&item.name), content))
    }

    fn render_mcp_servers(&self, servers: &[McpServer], existing: Option<&str>) -> Result<String> {
        let http: Vec<&McpServer> = servers.iter().filter(|s| Self::renders(s)).collect();
        mcp::render_codex(&http, existing)
    }

    fn parse_command(&self, name: &str, content: &str) -> Result<CanonicalItem> {
        let rest = after_heading(content, &format!("# /{name}"))
            .ok_or_else(|| parse_error(ItemType::Command, name, "missing '# /<name>' heading"))?;
        let (description, body) = take_paragraph(rest);

        let mut metadata = Metadata::new();
        if !description.trim().is_empty() {
            metadata.insert("description".into(), json!(description.trim()));
        }
        Ok(CanonicalItem::new(name, body_text(body)).with_metadata(metadata))
    }

    fn parse_agent(&self, name: &str, content: &str) -> Result<CanonicalItem> {
        let mut rest = after_heading(content, &format!("# Agent: {name}"))
            .ok_or_else(|| parse_error(ItemType::Agent, name, "missing '# Agent: <name>' heading"))?;

        let mut metadata = Metadata::new();
        if rest.starts_with(ROLE_PREFIX) {
            let (role, tail) = take_paragraph(rest);
            let description = role[ROLE_PREFIX.len()..].trim();
            if !description.is_empty() {
                metadata.insert("description".into(), json!(description));
            }
            rest = tail;
        }
        if rest.starts_with(TOOLS_PREFIX) {
            let (line, tail) = take_paragraph(rest);
            let tools: Vec<&str> = line[TOOLS_PREFIX.len()..]
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            metadata.insert("allowed-tools".into(), json!(tools));
            rest = tail;
        }
        Ok(CanonicalItem::new(name, body_text(rest)).with_metadata(metadata))
    }

    fn command_name_from_file(&self, file_name: &str) -> Option<String> {
        if file_name.starts_with(AGENT_PREFIX) {
            return None;
        }
        file_name.strip_suffix(".md").map(str::to_string)
    }

    fn agent_name_from_file(&self, file_name: &str) -> Option<String> {
        file_name
            .strip_prefix(AGENT_PREFIX)
            .and_then(|rest| rest.strip_suffix(".md"))
            .map(str::to_string)
    }

    fn rendered_server_names(&self, servers: &[McpServer]) -> Vec<String> {
        servers
            .iter()
            .filter(|s| Self::renders(s))
            .map(|s| s.name.clone())
            .collect()
    }

    fn parse_existing_mcp_server_names(&self, content: &str) -> Vec<String> {
        mcp::codex_server_names(content)
    }
}
