// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::{NewIssue, Store};

#[test]
fn test_first_child_is_one() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(next_child_number(&store.conn, "bd-af78e9a2").unwrap(), 1);
    assert_eq!(next_child_number(&store.conn, "bd-af78e9a2").unwrap(), 2);
    assert_eq!(next_child_number(&store.conn, "bd-af78e9a2").unwrap(), 3);
}

#[test]
fn test_independent_counters_per_parent() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(next_child_number(&store.conn, "bd-aaaa").unwrap(), 1);
    assert_eq!(next_child_number(&store.conn, "bd-bbbb").unwrap(), 1);
    assert_eq!(next_child_number(&store.conn, "bd-aaaa").unwrap(), 2);
    assert_eq!(next_child_number(&store.conn, "bd-aaaa.1").unwrap(), 1);
}

#[test]
fn test_counter_survives_child_deletion() {
    let mut store = Store::open_in_memory().unwrap();
    let parent = store
        .create_issue(
            &NewIssue {
                title: "Epic".into(),
                ..NewIssue::default()
            },
            "tester",
        )
        .unwrap()
        .id;

    let child = store
        .create_issue(
            &NewIssue {
                title: "Child".into(),
                parent: Some(parent.clone()),
                ..NewIssue::default()
            },
            "tester",
        )
        .unwrap();
    assert_eq!(child.id, format!("{parent}.1"));

    store.delete_issue(&child.id).unwrap();

    // Gap is permanent: the next child is .2, never a reissued .1
    let next = store
        .create_issue(
            &NewIssue {
                title: "Next child".into(),
                parent: Some(parent.clone()),
                ..NewIssue::default()
            },
            "tester",
        )
        .unwrap();
    assert_eq!(next.id, format!("{parent}.2"));
}

#[test]
fn test_raise_counter_never_lowers() {
    let store = Store::open_in_memory().unwrap();
    raise_counter_to(&store.conn, "bd-aaaa", 5).unwrap();
    assert_eq!(store.child_counter("bd-aaaa").unwrap(), 5);
    raise_counter_to(&store.conn, "bd-aaaa", 3).unwrap();
    assert_eq!(store.child_counter("bd-aaaa").unwrap(), 5);
    assert_eq!(next_child_number(&store.conn, "bd-aaaa").unwrap(), 6);
}

#[test]
fn test_concurrent_children_get_distinct_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beads.db");
    {
        let mut store = Store::open(&path).unwrap();
        store
            .create_issue(
                &NewIssue {
                    title: "Epic parent".into(),
                    ..NewIssue::default()
                },
                "tester",
            )
            .unwrap();
    }
    let parent = {
        let store = Store::open(&path).unwrap();
        store.get_all_issues().unwrap()[0].id.clone()
    };

    let mut handles = Vec::new();
    for i in 0..10 {
        let path = path.clone();
        let parent = parent.clone();
        handles.push(std::thread::spawn(move || {
            let mut store = Store::open(&path).unwrap();
            crate::db::retry_locked(|| {
                store.create_issue(
                    &NewIssue {
                        title: format!("Child {i}"),
                        parent: Some(parent.clone()),
                        ..NewIssue::default()
                    },
                    "tester",
                )
            })
            .unwrap()
            .id
        }));
    }

    let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 10, "duplicate child IDs allocated");

    let expected: std::collections::HashSet<String> =
        (1..=10).map(|n| format!("{parent}.{n}")).collect();
    let got: std::collections::HashSet<String> = ids.into_iter().collect();
    assert_eq!(got, expected);
}
