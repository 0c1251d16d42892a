// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_kind_classification() {
    assert_eq!(
        Error::IssueNotFound("bd-aaaa".into()).kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        Error::AmbiguousId {
            prefix: "a".into(),
            matches: vec!["bd-aa".into(), "bd-ab".into()],
        }
        .kind(),
        ErrorKind::Ambiguous
    );
    assert_eq!(
        Error::CycleDetected("blocks".into()).kind(),
        ErrorKind::Conflict
    );
    assert_eq!(Error::IdInUse("bd-aaaa".into()).kind(), ErrorKind::IdInUse);
    assert_eq!(
        Error::Malformed {
            line: 3,
            reason: "eof".into()
        }
        .kind(),
        ErrorKind::Malformed
    );
    assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
}

#[test]
fn test_locked_is_retryable() {
    assert!(Error::Locked("busy".into()).is_retryable());
    assert!(!Error::Cancelled.is_retryable());
    assert!(!Error::IssueNotFound("bd-aaaa".into()).is_retryable());
}

#[test]
fn test_ambiguous_message_lists_matches() {
    let err = Error::AmbiguousId {
        prefix: "af".into(),
        matches: vec!["bd-af78".into(), "bd-af9c".into()],
    };
    let msg = err.to_string();
    assert!(msg.contains("af"));
    assert!(msg.contains("bd-af78"));
    assert!(msg.contains("bd-af9c"));
}

#[test]
fn test_busy_sqlite_error_maps_to_locked() {
    let e = rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error {
            code: rusqlite::ffi::ErrorCode::DatabaseBusy,
            extended_code: 5,
        },
        Some("database is locked".into()),
    );
    let err: Error = e.into();
    assert_eq!(err.kind(), ErrorKind::Locked);
}
