// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::{NewIssue, Store};
use crate::issue::{DepType, IssueType, Status};
use crate::journal::{JournalDep, JournalRecord};
use chrono::Utc;

fn record(id: &str, title: &str) -> JournalRecord {
    let now = Utc::now();
    JournalRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        design: None,
        notes: None,
        acceptance_criteria: None,
        status: Status::Open,
        priority: 2,
        issue_type: IssueType::Task,
        assignee: None,
        external_ref: None,
        source_location: None,
        estimate: None,
        created_at: now,
        updated_at: now,
        closed_at: None,
        labels: Vec::new(),
        dependencies: Vec::new(),
        comments: Vec::new(),
        extra: Default::default(),
    }
}

#[test]
fn test_all_new_records() {
    let mut store = Store::open_in_memory().unwrap();
    let batch = vec![record("bd-aaaa", "One"), record("bd-bbbb", "Two")];

    let report = dry_run(&store, &batch, &ImportOptions::default()).unwrap();
    assert_eq!(report.new_count(), 2);
    assert_eq!(report.idempotent, 0);
    assert!(report.collisions.is_empty());
    assert!(!report.applied);

    let report = apply(&mut store, &batch, &ImportOptions::default(), "importer").unwrap();
    assert!(report.applied);
    assert_eq!(report.new_count(), 2);
    assert!(store.issue_exists("bd-aaaa").unwrap());
    assert!(store.issue_exists("bd-bbbb").unwrap());
}

#[test]
fn test_idempotent_reimport() {
    let mut store = Store::open_in_memory().unwrap();
    let batch = vec![record("bd-aaaa", "Stable")];
    apply(&mut store, &batch, &ImportOptions::default(), "importer").unwrap();

    // Re-importing the identical batch changes nothing
    let report = apply(&mut store, &batch, &ImportOptions::default(), "importer").unwrap();
    assert_eq!(report.idempotent, 1);
    assert_eq!(report.new_count(), 0);
    assert!(report.collisions.is_empty());
}

#[test]
fn test_collision_detected_in_dry_run() {
    let mut store = Store::open_in_memory().unwrap();
    apply(
        &mut store,
        &[record("bd-aaaa", "X")],
        &ImportOptions::default(),
        "importer",
    )
    .unwrap();

    let incoming = vec![record("bd-aaaa", "Y")];
    let report = dry_run(&store, &incoming, &ImportOptions::default()).unwrap();
    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.new_count(), 0);
    assert_eq!(report.idempotent, 0);

    let diffs = &report.collisions[0].diffs;
    assert!(diffs.iter().any(|d| d.field == "title"));
    let title_diff = diffs.iter().find(|d| d.field == "title").unwrap();
    assert_eq!(title_diff.local, "X");
    assert_eq!(title_diff.incoming, "Y");
}

#[test]
fn test_collision_aborts_without_resolve() {
    let mut store = Store::open_in_memory().unwrap();
    apply(
        &mut store,
        &[record("bd-aaaa", "X")],
        &ImportOptions::default(),
        "importer",
    )
    .unwrap();

    let result = apply(
        &mut store,
        &[record("bd-aaaa", "Y")],
        &ImportOptions::default(),
        "importer",
    );
    assert!(matches!(result, Err(Error::ImportCollision(_))));

    // Local record untouched
    assert_eq!(store.get_issue("bd-aaaa").unwrap().title, "X");
}

#[test]
fn test_collision_resolution_remaps_batch_references() {
    let mut store = Store::open_in_memory().unwrap();
    apply(
        &mut store,
        &[record("bd-aaaa", "X")],
        &ImportOptions::default(),
        "importer",
    )
    .unwrap();

    // Incoming batch: colliding bd-aaaa plus a record that references it
    // both as a dependency and in text
    let mut colliding = record("bd-aaaa", "Y");
    colliding.description = Some("incoming".into());
    let mut referencing = record("bd-cccc", "Ref");
    referencing.description = Some("see bd-aaaa for details".into());
    referencing.dependencies.push(JournalDep {
        to_id: "bd-aaaa".into(),
        dep_type: DepType::Blocks,
        created_at: Utc::now(),
    });

    let opts = ImportOptions {
        resolve_collisions: true,
        strict: false,
    };
    let report = apply(&mut store, &[colliding, referencing], &opts, "importer").unwrap();

    // A fresh hash ID was allocated
    let fresh = report.remapped.get("bd-aaaa").unwrap().clone();
    assert_ne!(fresh, "bd-aaaa");
    assert!(fresh.starts_with("bd-"));
    assert!(store.issue_exists(&fresh).unwrap());
    assert_eq!(store.get_issue(&fresh).unwrap().title, "Y");

    // Local bd-aaaa untouched
    assert_eq!(store.get_issue("bd-aaaa").unwrap().title, "X");

    // Intra-batch references rewritten
    let reference = store.get_issue("bd-cccc").unwrap();
    assert_eq!(
        reference.description.as_deref(),
        Some(format!("see {fresh} for details").as_str())
    );
    let deps = store.get_deps_from("bd-cccc").unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].to_id, fresh);
}

#[test]
fn test_dangling_reference_reported_not_fatal() {
    let mut store = Store::open_in_memory().unwrap();
    let mut rec = record("bd-aaaa", "Refers to nothing");
    rec.dependencies.push(JournalDep {
        to_id: "bd-gone".into(),
        dep_type: DepType::Blocks,
        created_at: Utc::now(),
    });

    let report = apply(
        &mut store,
        &[rec.clone()],
        &ImportOptions::default(),
        "importer",
    )
    .unwrap();
    assert_eq!(
        report.dangling,
        vec![("bd-aaaa".to_string(), "bd-gone".to_string())]
    );
    // The issue landed; the dangling edge did not
    assert!(store.issue_exists("bd-aaaa").unwrap());
    assert!(store.get_deps_from("bd-aaaa").unwrap().is_empty());
}

#[test]
fn test_strict_mode_rejects_dangling() {
    let mut store = Store::open_in_memory().unwrap();
    let mut rec = record("bd-aaaa", "Refers to nothing");
    rec.dependencies.push(JournalDep {
        to_id: "bd-gone".into(),
        dep_type: DepType::Blocks,
        created_at: Utc::now(),
    });

    let opts = ImportOptions {
        resolve_collisions: false,
        strict: true,
    };
    let result = apply(&mut store, &[rec], &opts, "importer");
    assert!(matches!(result, Err(Error::DanglingReference { .. })));
    assert!(!store.issue_exists("bd-aaaa").unwrap());
}

#[test]
fn test_intra_batch_dependency_is_not_dangling() {
    let store = Store::open_in_memory().unwrap();
    let mut a = record("bd-aaaa", "A");
    a.dependencies.push(JournalDep {
        to_id: "bd-bbbb".into(),
        dep_type: DepType::Blocks,
        created_at: Utc::now(),
    });
    let b = record("bd-bbbb", "B");

    let report = dry_run(&store, &[a, b], &ImportOptions::default()).unwrap();
    assert!(report.dangling.is_empty());
}

#[test]
fn test_import_restores_labels_and_comments() {
    let mut store = Store::open_in_memory().unwrap();
    let mut rec = record("bd-aaaa", "Furnished");
    rec.labels = vec!["a".into(), "b".into()];
    rec.comments.push(crate::journal::JournalComment {
        author: "alice".into(),
        text: "imported comment".into(),
        created_at: Utc::now(),
    });

    apply(&mut store, &[rec], &ImportOptions::default(), "importer").unwrap();

    assert_eq!(store.get_labels("bd-aaaa").unwrap(), vec!["a", "b"]);
    let comments = store.get_comments("bd-aaaa").unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author, "alice");
}

#[test]
fn test_imported_child_raises_counter() {
    let mut store = Store::open_in_memory().unwrap();
    let parent = record("bd-aaaa", "Parent");
    let mut child = record("bd-aaaa.3", "Child three");
    child.dependencies.push(JournalDep {
        to_id: "bd-aaaa".into(),
        dep_type: DepType::ParentChild,
        created_at: Utc::now(),
    });

    apply(
        &mut store,
        &[parent, child],
        &ImportOptions::default(),
        "importer",
    )
    .unwrap();

    // The counter skips past imported suffixes
    let next = store
        .create_issue(
            &NewIssue {
                title: "Next child".into(),
                parent: Some("bd-aaaa".into()),
                ..NewIssue::default()
            },
            "tester",
        )
        .unwrap();
    assert_eq!(next.id, "bd-aaaa.4");
}

#[test]
fn test_apply_is_all_or_nothing() {
    let mut store = Store::open_in_memory().unwrap();
    apply(
        &mut store,
        &[record("bd-aaaa", "X")],
        &ImportOptions::default(),
        "importer",
    )
    .unwrap();

    // One new record and one collision: without resolve the whole batch
    // must be rejected, including the new record
    let batch = vec![record("bd-bbbb", "New"), record("bd-aaaa", "Y")];
    let result = apply(&mut store, &batch, &ImportOptions::default(), "importer");
    assert!(result.is_err());
    assert!(!store.issue_exists("bd-bbbb").unwrap());
}
