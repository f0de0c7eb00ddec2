//! The `TargetAdapter` trait: everything the sync engine knows about a target

use crate::error::{Error, Result};
use crate::frontmatter;
use crate::paths::TargetPaths;
use crate::support;
use crate::types::{CanonicalItem, Capabilities, ItemType, McpServer, RenderedFile, Target};
use crate::{SKILL_FILE, claude, codex, gemini, opencode};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Rendering, reverse parsing and discovery for one target.
///
/// The engine calls only this interface and has no knowledge of any
/// target's concrete file syntax.
pub trait TargetAdapter {
    fn target(&self) -> Target;

    fn capabilities(&self) -> Capabilities;

    fn paths(&self) -> &TargetPaths;

    fn render_command(&self, item: &CanonicalItem) -> Result<RenderedFile>;

    fn render_agent(&self, item: &CanonicalItem) -> Result<RenderedFile>;

    /// Render `SKILL.md`. Support files are copied verbatim by the caller.
    fn render_skill(&self, item: &CanonicalItem) -> Result<RenderedFile> {
        let path = self.paths().skill_file(&item.name).ok_or(Error::Unsupported {
            target: self.target(),
            item_type: ItemType::Skill,
        })?;
        Ok(RenderedFile::new(
            path,
            frontmatter::stringify(&item.content, &item.metadata)?,
        ))
    }

    /// Render the complete MCP config file, merging into `existing` when given.
    fn render_mcp_servers(&self, servers: &[McpServer], existing: Option<&str>) -> Result<String>;

    fn render_instructions(&self, base: &str, addendum: &str) -> String {
        if addendum.trim().is_empty() {
            let mut out = base.trim_end().to_string();
            out.push('\n');
            out
        } else {
            format!("{base}\n\n{addendum}\n")
        }
    }

    fn parse_command(&self, name: &str, content: &str) -> Result<CanonicalItem> {
        parse_markdown(self.target(), ItemType::Command, name, content)
    }

    fn parse_agent(&self, name: &str, content: &str) -> Result<CanonicalItem> {
        parse_markdown(self.target(), ItemType::Agent, name, content)
    }

    /// Read an installed skill, support files included.
    fn read_skill(&self, name: &str) -> Result<CanonicalItem> {
        let dir = self.paths().skill_dir(name).ok_or(Error::Unsupported {
            target: self.target(),
            item_type: ItemType::Skill,
        })?;
        let raw = acsync_fs::io::read_text(&dir.join(SKILL_FILE))?;
        let item = parse_markdown(self.target(), ItemType::Skill, name, &raw)?;
        Ok(item.with_support_files(support::read_support_files(&dir)?))
    }

    /// Map an installed command file name to its item name.
    fn command_name_from_file(&self, file_name: &str) -> Option<String> {
        file_name.strip_suffix(".md").map(str::to_string)
    }

    fn agent_name_from_file(&self, file_name: &str) -> Option<String> {
        file_name.strip_suffix(".md").map(str::to_string)
    }

    fn list_existing_command_names(&self) -> Result<Vec<String>> {
        list_names(&self.paths().commands_dir(), |f| self.command_name_from_file(f))
    }

    fn list_existing_agent_names(&self) -> Result<Vec<String>> {
        list_names(&self.paths().agents_dir(), |f| self.agent_name_from_file(f))
    }

    /// Skill folders that contain a `SKILL.md`
    fn list_existing_skill_names(&self) -> Result<Vec<String>> {
        let Some(dir) = self.paths().skills_dir() else {
            return Ok(Vec::new());
        };
        let mut names = Vec::new();
        for name in read_dir_names(&dir)? {
            if !name.starts_with('.') && dir.join(&name).join(SKILL_FILE).is_file() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Names of the servers this target will actually render
    fn rendered_server_names(&self, servers: &[McpServer]) -> Vec<String> {
        servers
            .iter()
            .filter(|s| s.is_enabled() && !s.is_disabled_for(self.target()))
            .map(|s| s.name.clone())
            .collect()
    }

    /// Server names found in an installed MCP config. Malformed input yields none.
    fn parse_existing_mcp_server_names(&self, content: &str) -> Vec<String> {
        crate::mcp::json_server_names(content, crate::mcp::MCP_SERVERS_KEY)
    }

    /// Whether push replaces the whole server section, dropping non-canonical entries
    fn removes_non_canonical_on_push(&self) -> bool {
        true
    }
}

/// Build the adapter for `target`, resolving paths under `home`.
pub fn adapter_for(target: Target, home: &Path) -> Box<dyn TargetAdapter> {
    let paths = TargetPaths::new(target, home);
    match target {
        Target::ClaudeCode => Box::new(claude::ClaudeAdapter::new(paths)),
        Target::OpenCode => Box::new(opencode::OpenCodeAdapter::new(paths)),
        Target::Gemini => Box::new(gemini::GeminiAdapter::new(paths)),
        Target::Codex => Box::new(codex::CodexAdapter::new(paths)),
    }
}

pub(crate) fn parse_markdown(
    target: Target,
    item_type: ItemType,
    name: &str,
    content: &str,
) -> Result<CanonicalItem> {
    let doc = frontmatter::parse(content).map_err(|e| Error::Parse {
        target,
        item_type,
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(CanonicalItem::new(name, doc.body).with_metadata(doc.metadata))
}

fn list_names<F>(dir: &Path, to_name: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut names: Vec<String> = read_dir_names(dir)?
        .iter()
        .filter(|f| !f.starts_with('.'))
        .filter_map(|f| to_name(f))
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

fn read_dir_names(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(acsync_fs::Error::io(dir, e).into()),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| acsync_fs::Error::io(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
