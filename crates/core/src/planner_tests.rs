// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::{NewIssue, Store, UpdatePatch};
use crate::issue::Status;

fn create(store: &mut Store, title: &str, priority: u8) -> String {
    store
        .create_issue(
            &NewIssue {
                title: title.to_string(),
                priority,
                ..NewIssue::default()
            },
            "tester",
        )
        .unwrap()
        .id
}

#[test]
fn test_ready_frontier_respects_blockers() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a", 2);
    let b = create(&mut store, "b", 2);
    let c = create(&mut store, "c", 2);

    store
        .add_dependency(&a, &b, DepType::Blocks, "tester")
        .unwrap();
    store
        .add_dependency(&a, &c, DepType::Blocks, "tester")
        .unwrap();

    // Only the blocker is ready
    let ready = ready_work(&store, &IssueFilter::default()).unwrap();
    let ids: Vec<&str> = ready.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec![a.as_str()]);

    // Closing the blocker releases both dependents
    store.close_issue(&a, "tester", None).unwrap();
    let ready = ready_work(&store, &IssueFilter::default()).unwrap();
    let ids: Vec<&str> = ready.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec![b.as_str(), c.as_str()]);
}

#[test]
fn test_ready_orders_by_priority_then_created() {
    let mut store = Store::open_in_memory().unwrap();
    let low = create(&mut store, "low", 3);
    let high = create(&mut store, "high", 0);
    let mid = create(&mut store, "mid", 2);

    let ready = ready_work(&store, &IssueFilter::default()).unwrap();
    let ids: Vec<&str> = ready.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec![high.as_str(), mid.as_str(), low.as_str()]);
}

#[test]
fn test_in_progress_blocker_still_blocks() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "blocker", 2);
    let b = create(&mut store, "blocked", 2);
    store
        .add_dependency(&a, &b, DepType::Blocks, "tester")
        .unwrap();

    store
        .update_issue(
            &a,
            &UpdatePatch {
                status: Some(Status::InProgress),
                ..UpdatePatch::default()
            },
            "tester",
        )
        .unwrap();

    let ready = ready_work(&store, &IssueFilter::default()).unwrap();
    let ids: Vec<&str> = ready.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec![a.as_str()], "in_progress blocker must still block");
}

#[test]
fn test_parked_status_not_ready() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "parked", 2);
    store
        .update_issue(
            &a,
            &UpdatePatch {
                status: Some(Status::Blocked),
                ..UpdatePatch::default()
            },
            "tester",
        )
        .unwrap();

    assert!(ready_work(&store, &IssueFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_related_edges_never_block() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a", 2);
    let b = create(&mut store, "b", 2);
    store
        .add_dependency(&a, &b, DepType::Related, "tester")
        .unwrap();
    store
        .add_dependency(&b, &a, DepType::DiscoveredFrom, "tester")
        .unwrap();

    assert_eq!(ready_work(&store, &IssueFilter::default()).unwrap().len(), 2);
}

#[test]
fn test_non_closed_parent_does_not_gate_children() {
    let mut store = Store::open_in_memory().unwrap();
    let parent = create(&mut store, "epic", 2);
    let child = store
        .create_issue(
            &NewIssue {
                title: "child".into(),
                parent: Some(parent.clone()),
                ..NewIssue::default()
            },
            "tester",
        )
        .unwrap()
        .id;

    let ready = ready_work(&store, &IssueFilter::default()).unwrap();
    let ids: Vec<&str> = ready.iter().map(|i| i.id.as_str()).collect();
    assert!(ids.contains(&child.as_str()));
    assert!(ids.contains(&parent.as_str()));
}

#[test]
fn test_closing_is_monotone_for_ready() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a", 2);
    let b = create(&mut store, "b", 2);
    let c = create(&mut store, "c", 2);
    store
        .add_dependency(&a, &b, DepType::Blocks, "tester")
        .unwrap();
    store
        .add_dependency(&b, &c, DepType::Blocks, "tester")
        .unwrap();

    let before: std::collections::HashSet<String> = ready_work(&store, &IssueFilter::default())
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();

    store.close_issue(&a, "tester", None).unwrap();

    let after: std::collections::HashSet<String> = ready_work(&store, &IssueFilter::default())
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();

    // Closing never removes another issue from the frontier
    for id in before {
        if id != a {
            assert!(after.contains(&id), "{id} fell out of the ready set");
        }
    }
}

#[test]
fn test_blocked_work_reports_reasons() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "blocker", 2);
    let b = create(&mut store, "blocked", 2);
    let c = create(&mut store, "parked", 2);
    store
        .add_dependency(&a, &b, DepType::Blocks, "tester")
        .unwrap();
    store
        .update_issue(
            &c,
            &UpdatePatch {
                status: Some(Status::Blocked),
                ..UpdatePatch::default()
            },
            "tester",
        )
        .unwrap();

    let blocked = blocked_work(&store, &IssueFilter::default()).unwrap();
    assert_eq!(blocked.len(), 2);

    let by_id: std::collections::HashMap<&str, &BlockedInfo> =
        blocked.iter().map(|info| (info.issue.id.as_str(), info)).collect();
    assert_eq!(by_id[b.as_str()].open_blockers, vec![a.clone()]);
    assert!(by_id[b.as_str()].reason.contains(&a));
    assert!(by_id[c.as_str()].reason.contains("blocked"));
}

#[test]
fn test_dependency_tree_annotates_depth_and_type() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a", 2);
    let b = create(&mut store, "b", 2);
    let c = create(&mut store, "c", 2);
    store
        .add_dependency(&a, &b, DepType::Blocks, "tester")
        .unwrap();
    store
        .add_dependency(&b, &c, DepType::Blocks, "tester")
        .unwrap();

    let tree = dependency_tree(&store, &a, DEFAULT_TREE_DEPTH).unwrap();
    assert_eq!(tree.id, a);
    assert_eq!(tree.depth, 0);
    assert_eq!(tree.direction, Direction::Root);

    assert_eq!(tree.children.len(), 1);
    let child = &tree.children[0];
    assert_eq!(child.id, b);
    assert_eq!(child.depth, 1);
    assert_eq!(child.dep_type, Some(DepType::Blocks));
    assert_eq!(child.direction, Direction::Outgoing);

    assert_eq!(child.children.len(), 1);
    assert_eq!(child.children[0].id, c);
    assert_eq!(child.children[0].depth, 2);
}

#[test]
fn test_dependency_tree_cuts_related_cycles() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a", 2);
    let b = create(&mut store, "b", 2);
    store
        .add_dependency(&a, &b, DepType::Related, "tester")
        .unwrap();
    store
        .add_dependency(&b, &a, DepType::Related, "tester")
        .unwrap();

    // Must terminate and visit each node once
    let tree = dependency_tree(&store, &a, DEFAULT_TREE_DEPTH).unwrap();
    fn count(node: &TreeNode) -> usize {
        1 + node.children.iter().map(count).sum::<usize>()
    }
    assert_eq!(count(&tree), 2);
}

#[test]
fn test_dependency_tree_missing_root() {
    let store = Store::open_in_memory().unwrap();
    assert!(dependency_tree(&store, "bd-ffff", DEFAULT_TREE_DEPTH).is_err());
}
