// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::{NewIssue, Store};

fn create(store: &mut Store, title: &str) -> String {
    store
        .create_issue(
            &NewIssue {
                title: title.to_string(),
                ..NewIssue::default()
            },
            "tester",
        )
        .unwrap()
        .id
}

#[test]
fn test_add_and_get_dependency() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");

    store.add_dependency(&a, &b, DepType::Blocks, "tester").unwrap();

    let deps = store.get_deps_from(&a).unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].to_id, b);
    assert_eq!(deps[0].dep_type, DepType::Blocks);

    let incoming = store.get_deps_to(&b).unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].from_id, a);
}

#[test]
fn test_self_dependency() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");

    let result = store.add_dependency(&a, &a, DepType::Blocks, "tester");
    assert!(matches!(result, Err(Error::SelfDependency)));
}

#[test]
fn test_unknown_endpoint() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");

    let result = store.add_dependency(&a, "bd-ffff", DepType::Blocks, "tester");
    assert!(matches!(result, Err(Error::IssueNotFound(_))));
}

#[test]
fn test_blocks_cycle_detection() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");
    let c = create(&mut store, "c");

    store.add_dependency(&a, &b, DepType::Blocks, "tester").unwrap();
    store.add_dependency(&b, &c, DepType::Blocks, "tester").unwrap();

    // a -> b -> c; closing the loop must fail
    let result = store.add_dependency(&c, &a, DepType::Blocks, "tester");
    assert!(matches!(result, Err(Error::CycleDetected(_))));
}

#[test]
fn test_parent_child_cycle_detection() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");

    store
        .add_dependency(&a, &b, DepType::ParentChild, "tester")
        .unwrap();
    let result = store.add_dependency(&b, &a, DepType::ParentChild, "tester");
    assert!(matches!(result, Err(Error::CycleDetected(_))));
}

#[test]
fn test_related_may_form_cycles() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");

    store.add_dependency(&a, &b, DepType::Related, "tester").unwrap();
    store.add_dependency(&b, &a, DepType::Related, "tester").unwrap();

    assert_eq!(store.get_deps_from(&a).unwrap().len(), 1);
    assert_eq!(store.get_deps_from(&b).unwrap().len(), 1);
}

#[test]
fn test_single_parent_enforced() {
    let mut store = Store::open_in_memory().unwrap();
    let child = create(&mut store, "child");
    let p1 = create(&mut store, "parent one");
    let p2 = create(&mut store, "parent two");

    store
        .add_dependency(&child, &p1, DepType::ParentChild, "tester")
        .unwrap();
    let result = store.add_dependency(&child, &p2, DepType::ParentChild, "tester");
    assert!(matches!(result, Err(Error::ParentExists(_))));
}

#[test]
fn test_remove_dependency() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");

    store.add_dependency(&a, &b, DepType::Blocks, "tester").unwrap();
    store
        .remove_dependency(&a, &b, DepType::Blocks, "tester")
        .unwrap();

    assert!(store.get_deps_from(&a).unwrap().is_empty());

    let result = store.remove_dependency(&a, &b, DepType::Blocks, "tester");
    assert!(matches!(result, Err(Error::DependencyNotFound { .. })));
}

#[test]
fn test_open_blockers_ignore_closed() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");
    let c = create(&mut store, "c");

    store.add_dependency(&a, &c, DepType::Blocks, "tester").unwrap();
    store.add_dependency(&b, &c, DepType::Blocks, "tester").unwrap();

    assert_eq!(store.get_open_blockers(&c).unwrap().len(), 2);

    store.close_issue(&a, "tester", None).unwrap();
    assert_eq!(store.get_open_blockers(&c).unwrap(), vec![b.clone()]);

    store.close_issue(&b, "tester", None).unwrap();
    assert!(store.get_open_blockers(&c).unwrap().is_empty());
}

#[test]
fn test_in_progress_blocker_still_blocks() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");

    store.add_dependency(&a, &b, DepType::Blocks, "tester").unwrap();
    store
        .update_issue(
            &a,
            &crate::db::UpdatePatch {
                status: Some(crate::issue::Status::InProgress),
                ..Default::default()
            },
            "tester",
        )
        .unwrap();

    assert_eq!(store.get_open_blockers(&b).unwrap(), vec![a]);
}

#[test]
fn test_blocked_issue_ids() {
    let mut store = Store::open_in_memory().unwrap();
    let a = create(&mut store, "a");
    let b = create(&mut store, "b");
    let c = create(&mut store, "c");

    store.add_dependency(&a, &b, DepType::Blocks, "tester").unwrap();
    store.add_dependency(&a, &c, DepType::Blocks, "tester").unwrap();

    let mut blocked = store.get_blocked_issue_ids().unwrap();
    blocked.sort();
    let mut expected = vec![b, c];
    expected.sort();
    assert_eq!(blocked, expected);
}

#[test]
fn test_children_listing() {
    let mut store = Store::open_in_memory().unwrap();
    let parent = create(&mut store, "parent");
    let c1 = create(&mut store, "child 1");
    let c2 = create(&mut store, "child 2");

    store
        .add_dependency(&c1, &parent, DepType::ParentChild, "tester")
        .unwrap();
    store
        .add_dependency(&c2, &parent, DepType::ParentChild, "tester")
        .unwrap();

    let mut children = store.get_children(&parent).unwrap();
    children.sort();
    let mut expected = vec![c1, c2];
    expected.sort();
    assert_eq!(children, expected);
}
