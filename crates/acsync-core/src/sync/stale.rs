//! Stale detection: installed items the canonical set no longer has
//!
//! A type with no canonical items at all is treated as unmanaged, never as
//! "delete everything of this type".

use super::options::SyncOptions;
use super::plan::{Payload, PlannedOp, Snapshot};
use crate::drift::{McpWarning, McpWarningAction, Operation, OperationKind};
use crate::exclusion::{EntryStatus, ExclusionFilter};
use acsync_fs::fingerprint_target;
use acsync_targets::{ItemType, McpServer, TargetAdapter};
use std::collections::BTreeSet;

const STALE_REASON: &str = "Item not in canonical source (stale)";

/// Delete operations for stale commands, agents and skills at one target.
pub(crate) fn stale_operations(
    adapter: &dyn TargetAdapter,
    snapshot: &Snapshot,
    exclusions: &ExclusionFilter,
    options: &SyncOptions,
) -> Vec<PlannedOp> {
    let target = adapter.target();
    let paths = adapter.paths();
    let mut ops = Vec::new();

    for item_type in [ItemType::Command, ItemType::Agent, ItemType::Skill] {
        if !options.includes_type(item_type) || !adapter.capabilities().supports(item_type) {
            continue;
        }
        let Some(canonical) = snapshot.names(item_type).filter(|names| !names.is_empty()) else {
            continue;
        };

        let installed = match item_type {
            ItemType::Command => adapter.list_existing_command_names(),
            ItemType::Agent => adapter.list_existing_agent_names(),
            _ => adapter.list_existing_skill_names(),
        };
        let installed = match installed {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(target_name = %target, item_type = %item_type, error = %e, "Cannot list installed items");
                continue;
            }
        };

        for name in installed {
            if exclusions.classify(&name, canonical) != EntryStatus::NonCanonical {
                continue;
            }
            // Skills are removed as a folder but hashed by their SKILL.md
            let (target_path, skill_file) = match item_type {
                ItemType::Command => (paths.command_file(&name), None),
                ItemType::Agent => (paths.agent_file(&name), None),
                _ => match (paths.skill_dir(&name), paths.skill_file(&name)) {
                    (Some(dir), Some(file)) => (dir, Some(file)),
                    _ => continue,
                },
            };
            let old_hash = fingerprint_target(skill_file.as_deref().unwrap_or(&target_path));
            tracing::debug!(target_name = %target, item_type = %item_type, name = %name, "Stale item");
            ops.push(PlannedOp {
                operation: Operation {
                    kind: OperationKind::Delete,
                    item_type,
                    name,
                    target,
                    reason: STALE_REASON.to_string(),
                    old_hash,
                    new_hash: None,
                    source_path: None,
                    target_path: Some(target_path),
                },
                payload: Payload::Delete,
            });
        }
    }

    ops
}

/// Servers present in `existing` that `servers` no longer renders for this
/// target. `None` when the canonical set is empty or nothing is left over.
pub(crate) fn mcp_warning(
    adapter: &dyn TargetAdapter,
    servers: &[McpServer],
    existing: &str,
) -> Option<McpWarning> {
    if servers.is_empty() {
        return None;
    }
    let rendered: BTreeSet<String> = adapter.rendered_server_names(servers).into_iter().collect();
    let server_names: Vec<String> = adapter
        .parse_existing_mcp_server_names(existing)
        .into_iter()
        .filter(|name| !rendered.contains(name))
        .collect();
    if server_names.is_empty() {
        return None;
    }

    let action = if adapter.removes_non_canonical_on_push() {
        McpWarningAction::Remove
    } else {
        McpWarningAction::Orphan
    };
    Some(McpWarning {
        server_names,
        action,
    })
}
