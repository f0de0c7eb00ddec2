//! Claude Code adapter
//!
//! Frontmatter and body pass through verbatim. MCP servers live under
//! `mcpServers` in `~/.claude.json`.

use crate::adapter::TargetAdapter;
use crate::error::Result;
use crate::frontmatter;
use crate::mcp::{self, MCP_SERVERS_KEY};
use crate::paths::TargetPaths;
use crate::types::{CanonicalItem, Capabilities, McpServer, RenderedFile, Target};

pub struct ClaudeAdapter {
    paths: TargetPaths,
}

impl ClaudeAdapter {
    pub fn new(paths: TargetPaths) -> Self {
        Self { paths }
    }
}

impl TargetAdapter for ClaudeAdapter {
    fn target(&self) -> Target {
        Target::ClaudeCode
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
            frontmatter::stringify(&item.content, &item.metadata)?,
        ))
    }

    fn render_agent(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        Ok(RenderedFile::new(
            self.paths.agent_file(&item.name),
            frontmatter::stringify(&item.content, &item.metadata)?,
        ))
    }

    fn render_mcp_servers(&self, servers: &[McpServer], existing: Option<&str>) -> Result<String> {
        let entries = servers
            .iter()
            .filter(|s| s.is_enabled() && !s.is_disabled_for(Target::ClaudeCode))
            .map(|s| (s.name.clone(), mcp::standard_entry(s)))
            .collect();
        mcp::merge_json(Target::ClaudeCode, existing, MCP_SERVERS_KEY, entries)
    }
}
