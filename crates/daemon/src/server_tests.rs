// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use beads_ipc::{ErrorCode, FilterWire, NewIssueWire};

fn setup() -> (tempfile::TempDir, BeadsPaths, Store) {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join(".beads");
    std::fs::create_dir(&state).unwrap();
    let paths = BeadsPaths::at(state);
    let store = Store::open(&paths.db_path()).unwrap();
    (dir, paths, store)
}

fn create(store: &mut Store, paths: &BeadsPaths, title: &str) -> String {
    let response = dispatch(
        Request::Create {
            new: NewIssueWire {
                title: title.to_string(),
                ..NewIssueWire::default()
            },
            actor: "tester".into(),
        },
        store,
        paths,
    );
    match response {
        Response::Issue(issue) => issue.id,
        other => panic!("create failed: {other:?}"),
    }
}

#[test]
fn test_dispatch_create_get_roundtrip() {
    let (_dir, paths, mut store) = setup();
    let id = create(&mut store, &paths, "Served");

    match dispatch(Request::Get { id: id.clone() }, &mut store, &paths) {
        Response::Issue(issue) => {
            assert_eq!(issue.id, id);
            assert_eq!(issue.title, "Served");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_dispatch_maps_errors_to_codes() {
    let (_dir, paths, mut store) = setup();

    match dispatch(
        Request::Get {
            id: "bd-ffff".into(),
        },
        &mut store,
        &paths,
    ) {
        Response::Error { code, .. } => assert_eq!(code, ErrorCode::NotFound),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_dispatch_ready_work() {
    let (_dir, paths, mut store) = setup();
    let a = create(&mut store, &paths, "Blocker");
    let b = create(&mut store, &paths, "Blocked");
    store
        .add_dependency(&a, &b, beads_core::DepType::Blocks, "tester")
        .unwrap();

    match dispatch(
        Request::ReadyWork {
            filter: FilterWire::default(),
        },
        &mut store,
        &paths,
    ) {
        Response::Issues(issues) => {
            let ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, vec![a.as_str()]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_dispatch_export_returns_journal_text() {
    let (_dir, paths, mut store) = setup();
    let id = create(&mut store, &paths, "Exported");

    match dispatch(Request::Export, &mut store, &paths) {
        Response::Journal(text) => {
            assert!(text.contains(&id));
            assert!(text.ends_with('\n'));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_dispatch_import_dry_run_leaves_store_untouched() {
    let (_dir, paths, mut store) = setup();

    let journal_text = r#"{"id":"bd-abcd","title":"Incoming","status":"open","priority":2,"issue_type":"task","created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}"#;
    match dispatch(
        Request::Import {
            journal: format!("{journal_text}\n"),
            resolve_collisions: false,
            strict: false,
            dry_run: true,
            actor: "tester".into(),
        },
        &mut store,
        &paths,
    ) {
        Response::ImportReport(report) => {
            assert_eq!(report.new_count(), 1);
            assert!(!report.applied);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(!store.issue_exists("bd-abcd").unwrap());
}

#[test]
fn test_dispatch_malformed_import() {
    let (_dir, paths, mut store) = setup();

    match dispatch(
        Request::Import {
            journal: "not json\n".into(),
            resolve_collisions: false,
            strict: false,
            dry_run: false,
            actor: "tester".into(),
        },
        &mut store,
        &paths,
    ) {
        Response::Error { code, message } => {
            assert_eq!(code, ErrorCode::Malformed);
            assert!(message.contains("line 1"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_dispatch_ping_and_hello() {
    let (_dir, paths, mut store) = setup();
    assert!(matches!(
        dispatch(Request::Ping, &mut store, &paths),
        Response::Pong
    ));
    match dispatch(
        Request::Hello {
            version: "0.0.0".into(),
        },
        &mut store,
        &paths,
    ) {
        Response::Hello { version } => assert!(!version.is_empty()),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_reconcile_local_changes_win() {
    let (_dir, paths, mut store) = setup();
    let id = create(&mut store, &paths, "Local truth");
    assert!(store.dirty_count().unwrap() > 0);

    // An external edit lands while local state is dirty
    std::fs::write(
        paths.journal_path(),
        r#"{"id":"bd-9999","title":"External","status":"open","priority":2,"issue_type":"task","created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}"#
            .to_string()
            + "\n",
    )
    .unwrap();

    reconcile(&mut store, &paths);

    // The journal was rewritten from the store; the external record is gone
    let text = std::fs::read_to_string(paths.journal_path()).unwrap();
    assert!(text.contains(&id));
    assert!(!text.contains("bd-9999"));
    assert!(!store.issue_exists("bd-9999").unwrap());
    assert_eq!(store.dirty_count().unwrap(), 0);
}

#[test]
fn test_reconcile_clean_store_imports_journal() {
    let (_dir, paths, mut store) = setup();

    std::fs::write(
        paths.journal_path(),
        r#"{"id":"bd-9999","title":"External","status":"open","priority":2,"issue_type":"task","created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}"#
            .to_string()
            + "\n",
    )
    .unwrap();

    reconcile(&mut store, &paths);

    assert!(store.issue_exists("bd-9999").unwrap());
}

#[test]
fn test_reconcile_tolerates_malformed_journal() {
    let (_dir, paths, mut store) = setup();
    std::fs::write(paths.journal_path(), "garbage\n").unwrap();

    // Must log and keep running, leaving the store untouched
    reconcile(&mut store, &paths);
    assert_eq!(store.stats().unwrap().total, 0);
}
