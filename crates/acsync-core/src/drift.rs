//! Drift calculation: a 3-way hash comparison per item per target
//!
//! The source hash is the current canonical rendering, the target hash is what
//! is on disk, and the manifest hash is the last thing acsync wrote there.
//! On-disk reality always wins; the manifest only colours the reason text.

use crate::manifest::Manifest;
use acsync_targets::{ItemType, Target};
use serde::Serialize;
use std::path::PathBuf;

/// What a sync would do for one item at one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Skip,
    Delete,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Skip => "skip",
            OperationKind::Delete => "delete",
        }
    }

    /// Whether this kind counts as drift. Deletes are opt-in and do not.
    pub fn is_drift(self) -> bool {
        matches!(self, OperationKind::Create | OperationKind::Update)
    }
}

/// One planned action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub item_type: ItemType,
    pub name: String,
    pub target: Target,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<PathBuf>,
}

/// Operation counts by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub create: usize,
    pub update: usize,
    pub skip: usize,
    pub delete: usize,
}

impl Summary {
    pub fn record(&mut self, kind: OperationKind) {
        match kind {
            OperationKind::Create => self.create += 1,
            OperationKind::Update => self.update += 1,
            OperationKind::Skip => self.skip += 1,
            OperationKind::Delete => self.delete += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.create + self.update + self.skip + self.delete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum McpWarningAction {
    /// Push rewrites the whole server section and drops them
    Remove,
    /// They stay behind untouched
    Orphan,
}

/// MCP servers installed at a target that the canonical set no longer renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpWarning {
    pub server_names: Vec<String>,
    pub action: McpWarningAction,
}

/// The plan for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub target: Target,
    pub operations: Vec<Operation>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcp_warning: Option<McpWarning>,
}

impl DiffResult {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            operations: Vec::new(),
            summary: Summary::default(),
            mcp_warning: None,
        }
    }

    pub fn push(&mut self, operation: Operation) {
        self.summary.record(operation.kind);
        self.operations.push(operation);
    }

    /// Append another result's operations for the same target
    pub fn merge(&mut self, other: DiffResult) {
        for operation in other.operations {
            self.push(operation);
        }
        if other.mcp_warning.is_some() {
            self.mcp_warning = other.mcp_warning;
        }
    }

    pub fn has_drift(&self) -> bool {
        self.summary.create > 0 || self.summary.update > 0
    }

    pub fn operations_of(&self, kind: OperationKind) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(move |op| op.kind == kind)
    }
}

/// Outcome of a single hash comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub kind: OperationKind,
    pub reason: String,
}

/// Compare one item's hashes.
///
/// Only ever yields create, update or skip. An absent source is inert: stale
/// items are found by scanning target listings, never inferred here.
pub fn compare_hashes(
    source_hash: Option<&str>,
    target_hash: Option<&str>,
    manifest_hash: Option<&str>,
) -> Comparison {
    let (kind, reason) = match (source_hash, target_hash) {
        (None, _) => (
            OperationKind::Skip,
            "Item not in source (safe mode - skipped)".to_string(),
        ),
        (Some(_), None) => (OperationKind::Create, "Item not in target".to_string()),
        (Some(source), Some(target)) if source == target => {
            (OperationKind::Skip, "Item up to date".to_string())
        }
        (Some(_), Some(target)) => {
            let detail = match manifest_hash {
                Some(last) if last == target => "target matches last sync",
                Some(_) => "target modified outside acsync",
                None => "no sync record",
            };
            (
                OperationKind::Update,
                format!("Item content changed in source ({detail})"),
            )
        }
    };
    Comparison { kind, reason }
}

/// Hashes and paths for one item at one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftInput {
    pub item_type: ItemType,
    pub name: String,
    pub source_hash: Option<String>,
    pub target_hash: Option<String>,
    pub source_path: Option<PathBuf>,
    pub target_path: Option<PathBuf>,
}

/// Turn each input into exactly one operation, independently.
pub fn calculate_diff<I>(target: Target, inputs: I, manifest: &Manifest) -> DiffResult
where
    I: IntoIterator<Item = DriftInput>,
{
    let mut result = DiffResult::new(target);
    for input in inputs {
        let manifest_hash = manifest.lookup(input.item_type, &input.name, target);
        let comparison = compare_hashes(
            input.source_hash.as_deref(),
            input.target_hash.as_deref(),
            manifest_hash,
        );
        tracing::debug!(
            target_name = %target,
            item_type = %input.item_type,
            name = %input.name,
            action = comparison.kind.as_str(),
            "Compared"
        );
        result.push(Operation {
            kind: comparison.kind,
            item_type: input.item_type,
            name: input.name,
            target,
            reason: comparison.reason,
            old_hash: input.target_hash,
            new_hash: input.source_hash,
            source_path: input.source_path,
            target_path: input.target_path,
        });
    }
    result
}
