//! Canonical storage: the project-side source of truth
//!
//! ```text
//! <project>/AGENTS.md
//! <project>/configs/common/commands/<name>.md
//! <project>/configs/common/agents/<name>.md
//! <project>/configs/common/skills/<name>/SKILL.md   (+ support files)
//! <project>/configs/common/mcp/<name>.json
//! <project>/configs/common/instructions/<target>.md
//! ```

use crate::error::{Error, Result, Severity};
use crate::exclusion::ExclusionFilter;
use acsync_targets::{CanonicalItem, ItemType, McpServer, SKILL_FILE, Target, frontmatter, support};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const INSTRUCTIONS_FILE: &str = "AGENTS.md";

/// A per-item failure that does not abort the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemIssue {
    pub item_type: ItemType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    pub message: String,
    pub severity: Severity,
}

impl ItemIssue {
    pub fn new(item_type: ItemType, name: impl Into<String>, error: &Error) -> Self {
        Self {
            item_type,
            name: name.into(),
            target: None,
            message: error.to_string(),
            severity: error.severity(),
        }
    }

    pub fn at(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
}

/// Either a usable item or the reason it was skipped
pub type ItemResult<T = CanonicalItem> = std::result::Result<T, ItemIssue>;

/// Project-wide instructions plus the per-target addendum
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instructions {
    pub base: String,
    pub addendum: String,
}

/// Read access to canonical items
pub trait CanonicalSource {
    /// Commands, agents or skills, sorted by name
    fn read_items(&self, item_type: ItemType) -> Vec<ItemResult>;

    fn read_mcp_servers(&self) -> Vec<ItemResult<McpServer>>;

    /// `None` when the project has no `AGENTS.md`
    fn read_instructions(&self, target: Target) -> Result<Option<Instructions>>;

    /// Names present on disk, whether or not they parse
    fn existing_names(&self, item_type: ItemType) -> Result<BTreeSet<String>>;

    /// Canonical file of a command or agent, or the `SKILL.md` of a skill
    fn item_path(&self, item_type: ItemType, name: &str) -> PathBuf;

    fn skill_dir(&self, name: &str) -> PathBuf;
}

/// Filesystem-backed canonical store
#[derive(Debug, Clone)]
pub struct FsCanonicalStore {
    project_dir: PathBuf,
    exclusions: ExclusionFilter,
}

impl FsCanonicalStore {
    pub fn new(project_dir: impl Into<PathBuf>, exclusions: ExclusionFilter) -> Self {
        Self {
            project_dir: project_dir.into(),
            exclusions,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn common_dir(&self) -> PathBuf {
        self.project_dir.join("configs").join("common")
    }

    fn type_dir(&self, item_type: ItemType) -> PathBuf {
        let dir = match item_type {
            ItemType::Command => "commands",
            ItemType::Agent => "agents",
            ItemType::Skill => "skills",
            ItemType::Mcp => "mcp",
            ItemType::Instruction => "instructions",
        };
        self.common_dir().join(dir)
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.project_dir.join(INSTRUCTIONS_FILE)
    }

    pub fn addendum_path(&self, target: Target) -> PathBuf {
        self.type_dir(ItemType::Instruction)
            .join(format!("{}.md", target.display_name()))
    }

    /// Visible, non-excluded entries of `dir`, sorted
    fn entries(&self, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(acsync_fs::Error::io(dir, e).into()),
        };
        let mut entries = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| acsync_fs::Error::io(dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || self.exclusions.is_excluded(&name) {
                continue;
            }
            entries.push((name, entry.path()));
        }
        entries.sort();
        Ok(entries)
    }

    /// `(item name, path)` for each item of `item_type` on disk
    fn item_entries(&self, item_type: ItemType) -> Result<Vec<(String, PathBuf)>> {
        let entries = self.entries(&self.type_dir(item_type))?;
        let items = match item_type {
            ItemType::Skill => entries
                .into_iter()
                .filter(|(_, path)| path.join(SKILL_FILE).is_file())
                .collect(),
            ItemType::Mcp => with_extension(entries, ".json"),
            ItemType::Command | ItemType::Agent => with_extension(entries, ".md"),
            ItemType::Instruction => Vec::new(),
        };
        Ok(items)
    }

    fn read_markdown(&self, item_type: ItemType, name: &str, path: &Path) -> Result<CanonicalItem> {
        let raw = acsync_fs::io::read_text(path)?;
        let doc = frontmatter::parse(&raw).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let item = CanonicalItem::new(name, doc.body).with_metadata(doc.metadata);
        if item_type == ItemType::Skill {
            let dir = self.skill_dir(name);
            return Ok(item.with_support_files(support::read_support_files(&dir)?));
        }
        Ok(item)
    }
}

fn with_extension(entries: Vec<(String, PathBuf)>, ext: &str) -> Vec<(String, PathBuf)> {
    entries
        .into_iter()
        .filter(|(_, path)| path.is_file())
        .filter_map(|(name, path)| name.strip_suffix(ext).map(|stem| (stem.to_string(), path)))
        .collect()
}

impl CanonicalSource for FsCanonicalStore {
    fn read_items(&self, item_type: ItemType) -> Vec<ItemResult> {
        if !matches!(item_type, ItemType::Command | ItemType::Agent | ItemType::Skill) {
            return Vec::new();
        }
        let entries = match self.item_entries(item_type) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(item_type = %item_type, error = %e, "Cannot list canonical items");
                return vec![Err(ItemIssue::new(item_type, "*", &e))];
            }
        };

        entries
            .into_iter()
            .map(|(name, path)| {
                let file = if item_type == ItemType::Skill {
                    path.join(SKILL_FILE)
                } else {
                    path
                };
                self.read_markdown(item_type, &name, &file).map_err(|e| {
                    tracing::warn!(item_type = %item_type, name = %name, error = %e, "Skipping canonical item");
                    ItemIssue::new(item_type, &name, &e)
                })
            })
            .collect()
    }

    fn read_mcp_servers(&self) -> Vec<ItemResult<McpServer>> {
        let entries = match self.item_entries(ItemType::Mcp) {
            Ok(entries) => entries,
            Err(e) => return vec![Err(ItemIssue::new(ItemType::Mcp, "*", &e))],
        };

        entries
            .into_iter()
            .map(|(stem, path)| {
                let parsed = acsync_fs::io::read_text(&path)
                    .map_err(Error::from)
                    .and_then(|raw| {
                        serde_json::from_str::<McpServer>(&raw).map_err(|e| Error::Parse {
                            path: path.clone(),
                            message: e.to_string(),
                        })
                    });
                match parsed {
                    Ok(mut server) => {
                        if server.name.is_empty() {
                            server.name = stem;
                        }
                        Ok(server)
                    }
                    Err(e) => {
                        tracing::warn!(name = %stem, error = %e, "Skipping MCP server");
                        Err(ItemIssue::new(ItemType::Mcp, stem, &e))
                    }
                }
            })
            .collect()
    }

    fn read_instructions(&self, target: Target) -> Result<Option<Instructions>> {
        let Some(base) = acsync_fs::io::read_text_opt(&self.instructions_path())? else {
            return Ok(None);
        };
        let addendum = acsync_fs::io::read_text_opt(&self.addendum_path(target))?.unwrap_or_default();
        Ok(Some(Instructions { base, addendum }))
    }

    fn existing_names(&self, item_type: ItemType) -> Result<BTreeSet<String>> {
        Ok(self
            .item_entries(item_type)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn item_path(&self, item_type: ItemType, name: &str) -> PathBuf {
        match item_type {
            ItemType::Skill => self.skill_dir(name).join(SKILL_FILE),
            ItemType::Mcp => self.type_dir(item_type).join(format!("{name}.json")),
            ItemType::Instruction => self.instructions_path(),
            ItemType::Command | ItemType::Agent => {
                self.type_dir(item_type).join(format!("{name}.md"))
            }
        }
    }

    fn skill_dir(&self, name: &str) -> PathBuf {
        self.type_dir(ItemType::Skill).join(name)
    }
}
