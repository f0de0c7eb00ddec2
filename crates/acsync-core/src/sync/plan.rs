//! Rendering canonical state per target and comparing it with disk
//!
//! A [`Snapshot`] is read once per invocation; every target is planned from
//! it, and push executes the same renders the plan was computed from.

use super::options::SyncOptions;
use super::stale;
use crate::canonical::{CanonicalSource, Instructions, ItemIssue};
use crate::drift::{DiffResult, DriftInput, McpWarning, Operation, OperationKind, calculate_diff};
use crate::error::Error;
use crate::exclusion::ExclusionFilter;
use crate::manifest::Manifest;
use acsync_fs::{fingerprint, fingerprint_parts, fingerprint_target};
use acsync_targets::{
    CanonicalItem, ItemType, McpServer, SKILL_FILE, SupportFile, Target, TargetAdapter,
};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;

/// Name of the single instruction operation per target
pub const INSTRUCTIONS_NAME: &str = "instructions";

/// Canonical state read once per invocation
#[derive(Debug, Default)]
pub(crate) struct Snapshot {
    items: BTreeMap<ItemType, Vec<CanonicalItem>>,
    pub servers: Vec<McpServer>,
    instructions: BTreeMap<Target, Instructions>,
    names: BTreeMap<ItemType, BTreeSet<String>>,
    pub issues: Vec<ItemIssue>,
}

impl Snapshot {
    pub fn load(source: &dyn CanonicalSource, options: &SyncOptions, targets: &[Target]) -> Self {
        let mut snapshot = Self::default();

        for item_type in [ItemType::Command, ItemType::Agent, ItemType::Skill] {
            if !options.includes_type(item_type) {
                continue;
            }
            let mut items = Vec::new();
            for result in source.read_items(item_type) {
                match result {
                    Ok(item) => items.push(item),
                    Err(issue) => snapshot.issues.push(issue),
                }
            }
            snapshot.items.insert(item_type, items);

            let names = source.existing_names(item_type).unwrap_or_else(|e| {
                tracing::warn!(item_type = %item_type, error = %e, "Cannot list canonical names");
                BTreeSet::new()
            });
            snapshot.names.insert(item_type, names);
        }

        if options.includes_type(ItemType::Mcp) {
            for result in source.read_mcp_servers() {
                match result {
                    Ok(server) => snapshot.servers.push(server),
                    Err(issue) => snapshot.issues.push(issue),
                }
            }
        }

        if options.includes_type(ItemType::Instruction) {
            for &target in targets {
                match source.read_instructions(target) {
                    Ok(Some(instructions)) => {
                        snapshot.instructions.insert(target, instructions);
                    }
                    Ok(None) => {}
                    Err(e) => snapshot.issues.push(
                        ItemIssue::new(ItemType::Instruction, INSTRUCTIONS_NAME, &e).at(target),
                    ),
                }
            }
        }

        snapshot
    }

    pub fn items(&self, item_type: ItemType) -> &[CanonicalItem] {
        self.items.get(&item_type).map(Vec::as_slice).unwrap_or_default()
    }

    /// Canonical names on disk, including items that failed to parse
    pub fn names(&self, item_type: ItemType) -> Option<&BTreeSet<String>> {
        self.names.get(&item_type)
    }
}

/// What executing an operation writes
#[derive(Debug, Clone)]
pub(crate) enum Payload {
    File(String),
    Skill {
        content: String,
        support_files: Vec<SupportFile>,
    },
    /// Re-rendered at write time against the backed-up config
    Mcp,
    Delete,
}

#[derive(Debug, Clone)]
pub(crate) struct PlannedOp {
    pub operation: Operation,
    pub payload: Payload,
}

/// Everything known about one target for this invocation
#[derive(Debug, Clone)]
pub(crate) struct TargetPlan {
    pub target: Target,
    pub ops: Vec<PlannedOp>,
    pub mcp_warning: Option<McpWarning>,
    pub issues: Vec<ItemIssue>,
}

impl TargetPlan {
    pub fn diff(&self) -> DiffResult {
        let mut result = DiffResult::new(self.target);
        for op in &self.ops {
            result.push(op.operation.clone());
        }
        result.mcp_warning = self.mcp_warning.clone();
        result
    }

    pub fn has_deletes(&self) -> bool {
        self.ops
            .iter()
            .any(|op| op.operation.kind == OperationKind::Delete)
    }
}

struct Collector<'a> {
    adapter: &'a dyn TargetAdapter,
    source: &'a dyn CanonicalSource,
    inputs: Vec<DriftInput>,
    payloads: Vec<Payload>,
    issues: Vec<ItemIssue>,
}

impl Collector<'_> {
    fn add(&mut self, input: DriftInput, payload: Payload) {
        self.inputs.push(input);
        self.payloads.push(payload);
    }

    fn issue(&mut self, item_type: ItemType, name: &str, error: &Error) {
        tracing::warn!(
            target_name = %self.adapter.target(),
            item_type = %item_type,
            name,
            error = %error,
            "Skipping item"
        );
        self.issues
            .push(ItemIssue::new(item_type, name, error).at(self.adapter.target()));
    }

    fn file_item(&mut self, item_type: ItemType, item: &CanonicalItem) {
        let rendered = match item_type {
            ItemType::Command => self.adapter.render_command(item),
            _ => self.adapter.render_agent(item),
        };
        match rendered {
            Ok(rendered) => {
                let input = DriftInput {
                    item_type,
                    name: item.name.clone(),
                    source_hash: Some(fingerprint(&rendered.content)),
                    target_hash: fingerprint_target(&rendered.path),
                    source_path: Some(self.source.item_path(item_type, &item.name)),
                    target_path: Some(rendered.path),
                };
                self.add(input, Payload::File(rendered.content));
            }
            Err(e) => self.issue(item_type, &item.name, &Error::from(e)),
        }
    }

    fn skill(&mut self, item: &CanonicalItem) {
        let rendered = match self.adapter.render_skill(item) {
            Ok(rendered) => rendered,
            Err(e) => return self.issue(ItemType::Skill, &item.name, &Error::from(e)),
        };
        let Some(dir) = self.adapter.paths().skill_dir(&item.name) else {
            return;
        };

        let source_hash = skill_fingerprint(rendered.content.as_bytes(), &item.support_files, |f| {
            Some(f.content.clone())
        });
        let target_hash = read_target_bytes(&rendered.path).map(|skill_md| {
            skill_fingerprint(&skill_md, &item.support_files, |f| {
                read_target_bytes(&dir.join(&f.relative_path))
            })
        });

        let input = DriftInput {
            item_type: ItemType::Skill,
            name: item.name.clone(),
            source_hash: Some(source_hash),
            target_hash,
            source_path: Some(self.source.skill_dir(&item.name)),
            target_path: Some(dir),
        };
        self.add(
            input,
            Payload::Skill {
                content: rendered.content,
                support_files: item.support_files.clone(),
            },
        );
    }

    /// One operation per rendered server, all sharing the config file
    fn mcp(&mut self, servers: &[McpServer]) -> Option<McpWarning> {
        let names = self.adapter.rendered_server_names(servers);
        if names.is_empty() {
            return None;
        }
        let path = self.adapter.paths().mcp_config();
        let existing = match acsync_fs::io::read_text_opt(&path) {
            Ok(existing) => existing,
            Err(e) => {
                let error = Error::from(e);
                for name in &names {
                    self.issue(ItemType::Mcp, name, &error);
                }
                return None;
            }
        };

        let rendered = match self.adapter.render_mcp_servers(servers, existing.as_deref()) {
            Ok(rendered) => rendered,
            Err(e) => {
                let error = Error::Parse {
                    path: path.clone(),
                    message: e.to_string(),
                };
                for name in &names {
                    self.issue(ItemType::Mcp, name, &error);
                }
                return None;
            }
        };

        let source_hash = fingerprint(&rendered);
        let target_hash = existing.as_deref().map(fingerprint);
        for name in names {
            let input = DriftInput {
                item_type: ItemType::Mcp,
                name: name.clone(),
                source_hash: Some(source_hash.clone()),
                target_hash: target_hash.clone(),
                source_path: Some(self.source.item_path(ItemType::Mcp, &name)),
                target_path: Some(path.clone()),
            };
            self.add(input, Payload::Mcp);
        }

        existing
            .as_deref()
            .and_then(|content| stale::mcp_warning(self.adapter, servers, content))
    }

    fn instructions(&mut self, instructions: &Instructions) {
        let content = self
            .adapter
            .render_instructions(&instructions.base, &instructions.addendum);
        let path = self.adapter.paths().instructions_file();
        let input = DriftInput {
            item_type: ItemType::Instruction,
            name: INSTRUCTIONS_NAME.to_string(),
            source_hash: Some(fingerprint(&content)),
            target_hash: fingerprint_target(&path),
            source_path: Some(self.source.item_path(ItemType::Instruction, INSTRUCTIONS_NAME)),
            target_path: Some(path),
        };
        self.add(input, Payload::File(content));
    }
}

/// Render every in-scope item for `adapter` and compare it with disk.
pub(crate) fn plan_target(
    adapter: &dyn TargetAdapter,
    snapshot: &Snapshot,
    source: &dyn CanonicalSource,
    manifest: &Manifest,
    exclusions: &ExclusionFilter,
    options: &SyncOptions,
) -> TargetPlan {
    let target = adapter.target();
    let capabilities = adapter.capabilities();
    let mut collector = Collector {
        adapter,
        source,
        inputs: Vec::new(),
        payloads: Vec::new(),
        issues: Vec::new(),
    };
    let mut mcp_warning = None;

    for item_type in ItemType::ALL {
        if !options.includes_type(item_type) || !capabilities.supports(item_type) {
            continue;
        }
        match item_type {
            ItemType::Command | ItemType::Agent => {
                for item in snapshot.items(item_type) {
                    collector.file_item(item_type, item);
                }
            }
            ItemType::Skill => {
                for item in snapshot.items(item_type) {
                    collector.skill(item);
                }
            }
            ItemType::Mcp => mcp_warning = collector.mcp(&snapshot.servers),
            ItemType::Instruction => {
                if let Some(instructions) = snapshot.instructions.get(&target) {
                    collector.instructions(instructions);
                }
            }
        }
    }

    let Collector {
        inputs,
        payloads,
        issues,
        ..
    } = collector;
    let diff = calculate_diff(target, inputs, manifest);
    let mut ops: Vec<PlannedOp> = diff
        .operations
        .into_iter()
        .zip(payloads)
        .map(|(operation, payload)| PlannedOp { operation, payload })
        .collect();
    ops.extend(stale::stale_operations(adapter, snapshot, exclusions, options));

    TargetPlan {
        target,
        ops,
        mcp_warning,
        issues,
    }
}

/// Composite fingerprint of `SKILL.md` plus support files, labelled by path.
/// Support files `read` cannot produce are left out, so they still differ.
pub(crate) fn skill_fingerprint<F>(skill_md: &[u8], support_files: &[SupportFile], read: F) -> String
where
    F: Fn(&SupportFile) -> Option<Vec<u8>>,
{
    let mut parts: Vec<(String, Vec<u8>)> = vec![(SKILL_FILE.to_string(), skill_md.to_vec())];
    for file in support_files {
        if let Some(bytes) = read(file) {
            let label = file.relative_path.to_string_lossy().replace('\\', "/");
            parts.push((label, bytes));
        }
    }
    fingerprint_parts(parts.iter().map(|(label, bytes)| (label.as_str(), bytes.as_slice())))
}

/// Bytes of a target file; any failure counts as absent
fn read_target_bytes(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable target file, treating as absent");
            None
        }
    }
}
