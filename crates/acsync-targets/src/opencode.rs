//! OpenCode adapter

use crate::adapter::{TargetAdapter, parse_markdown};
use crate::error::Result;
use crate::frontmatter;
use crate::mcp::{self, OPENCODE_KEY};
use crate::paths::TargetPaths;
use crate::types::{CanonicalItem, Capabilities, ItemType, McpServer, Metadata, RenderedFile, Target};
use serde_json::json;

pub struct OpenCodeAdapter {
    paths: TargetPaths,
}

impl OpenCodeAdapter {
    pub fn new(paths: TargetPaths) -> Self {
        Self { paths }
    }
}

fn description_only(item: &CanonicalItem) -> Metadata {
    let mut metadata = Metadata::new();
    if let Some(description) = item.metadata.get("description") {
        metadata.insert("description".into(), description.clone());
    }
    metadata
}

impl TargetAdapter for OpenCodeAdapter {
    fn target(&self) -> Target {
        Target::OpenCode
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn paths(&self) -> &TargetPaths {
        &self.paths
    }

    fn render_command(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        Ok(RenderedFile::new(
            self.paths.command_file(&item.name),
            frontmatter::stringify(&item.content, &description_only(item))?,
        ))
    }

    fn render_agent(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        let mut metadata = description_only(item);
        metadata.insert("mode".into(), json!("subagent"));
        Ok(RenderedFile::new(
            self.paths.agent_file(&item.name),
            frontmatter::stringify(&item.content, &metadata)?,
        ))
    }

    fn render_mcp_servers(&self, servers: &[McpServer], existing: Option<&str>) -> Result<String> {
        let entries = servers
            .iter()
            .filter(|s| !s.is_disabled_for(Target::OpenCode))
            .map(|s| (s.name.clone(), mcp::opencode_entry(s)))
            .collect();
        mcp::merge_json(Target::OpenCode, existing, OPENCODE_KEY, entries)
    }

    fn parse_agent(&self, name: &str, content: &str) -> Result<CanonicalItem> {
        let mut item = parse_markdown(Target::OpenCode, ItemType::Agent, name, content)?;
        item.metadata.shift_remove("mode");
        Ok(item)
    }

    /// OpenCode has a native `enabled` flag, so disabled servers are still written.
    fn rendered_server_names(&self, servers: &[McpServer]) -> Vec<String> {
        servers
            .iter()
            .filter(|s| !s.is_disabled_for(Target::OpenCode))
            .map(|s| s.name.clone())
            .collect()
    }

    fn parse_existing_mcp_server_names(&self, content: &str) -> Vec<String> {
        mcp::json_server_names(content, OPENCODE_KEY)
    }
}
