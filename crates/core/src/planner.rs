// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The ready-work planner.
//!
//! An issue is ready when its status is workable (open or in_progress) and
//! no `blocks` edge points at it from an issue that is not closed. A
//! blocker blocks until it is closed; `in_progress` blockers still block.
//! Results are ordered priority ascending, then created_at ascending.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::db::{IssueFilter, Store};
use crate::error::Result;
use crate::issue::{DepType, Issue};

/// A not-ready issue together with why the planner excluded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedInfo {
    pub issue: Issue,
    /// Open blockers keeping the issue out of the frontier.
    pub open_blockers: Vec<String>,
    /// Human-readable exclusion summary.
    pub reason: String,
}

/// Issues that are ready to work on, best first.
///
/// The filter's status field is ignored; readiness implies open or
/// in_progress. Other filter dimensions (type, labels, priority range,
/// assignee, pagination) apply as usual.
pub fn ready_work(store: &Store, filter: &IssueFilter) -> Result<Vec<Issue>> {
    let mut unpaged = filter.clone();
    unpaged.status = None;
    let offset = unpaged.offset.take().unwrap_or(0);
    let limit = unpaged.limit.take();

    let issues = store.list_issues(&unpaged)?;
    let blocked: HashSet<String> = store.get_blocked_issue_ids()?.into_iter().collect();

    let ready = issues
        .into_iter()
        .filter(|i| i.status.is_workable() && !blocked.contains(&i.id))
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    Ok(ready)
}

/// Workable issues the frontier omitted, each with its reason.
pub fn blocked_work(store: &Store, filter: &IssueFilter) -> Result<Vec<BlockedInfo>> {
    let mut unpaged = filter.clone();
    unpaged.status = None;
    unpaged.offset = None;
    unpaged.limit = None;

    let issues = store.list_issues(&unpaged)?;
    let mut out = Vec::new();

    for issue in issues {
        if issue.status.is_closed() {
            continue;
        }
        let open_blockers = store.get_open_blockers(&issue.id)?;
        if issue.status.is_workable() && open_blockers.is_empty() {
            continue;
        }
        let reason = if !open_blockers.is_empty() {
            format!("blocked by {}", open_blockers.join(", "))
        } else {
            format!("status is {}", issue.status)
        };
        out.push(BlockedInfo {
            issue,
            open_blockers,
            reason,
        });
    }

    Ok(out)
}

/// Which side of the root an edge was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The tree root itself.
    Root,
    /// Edge from the parent node to this one.
    Outgoing,
    /// Edge from this node to the parent node.
    Incoming,
}

/// A node in the dependency tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    /// Edge type connecting this node to its tree parent (None at the root).
    pub dep_type: Option<DepType>,
    pub direction: Direction,
    pub depth: usize,
    pub children: Vec<TreeNode>,
}

/// Default traversal depth for dependency trees.
pub const DEFAULT_TREE_DEPTH: usize = 10;

/// Walk the dependency graph outward from an issue, depth-first.
///
/// Both outgoing and incoming edges are followed, annotated with type and
/// depth. Each issue appears at most once: the visited set cuts cycles in
/// the `related` subgraph and keeps reverse edges from reflecting back.
pub fn dependency_tree(store: &Store, id: &str, max_depth: usize) -> Result<TreeNode> {
    // Root must exist
    store.get_issue(id)?;

    let mut visited = HashSet::new();
    visited.insert(id.to_string());
    let children = walk(store, id, 1, max_depth, &mut visited)?;

    Ok(TreeNode {
        id: id.to_string(),
        dep_type: None,
        direction: Direction::Root,
        depth: 0,
        children,
    })
}

fn walk(
    store: &Store,
    id: &str,
    depth: usize,
    max_depth: usize,
    visited: &mut HashSet<String>,
) -> Result<Vec<TreeNode>> {
    if depth > max_depth {
        return Ok(Vec::new());
    }

    let mut nodes = Vec::new();

    for dep in store.get_deps_from(id)? {
        if visited.insert(dep.to_id.clone()) {
            nodes.push(TreeNode {
                children: walk(store, &dep.to_id, depth + 1, max_depth, visited)?,
                id: dep.to_id,
                dep_type: Some(dep.dep_type),
                direction: Direction::Outgoing,
                depth,
            });
        }
    }
    for dep in store.get_deps_to(id)? {
        if visited.insert(dep.from_id.clone()) {
            nodes.push(TreeNode {
                children: walk(store, &dep.from_id, depth + 1, max_depth, visited)?,
                id: dep.from_id,
                dep_type: Some(dep.dep_type),
                direction: Direction::Incoming,
                depth,
            });
        }
    }

    Ok(nodes)
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
