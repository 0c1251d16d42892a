// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_exit_codes_follow_error_kind() {
    let cases: Vec<(beads_core::Error, i32)> = vec![
        (
            beads_core::Error::InvalidInput("bad".into()),
            1,
        ),
        (
            beads_core::Error::Malformed {
                line: 1,
                reason: "x".into(),
            },
            1,
        ),
        (beads_core::Error::IssueNotFound("bd-a".into()), 2),
        (
            beads_core::Error::AmbiguousId {
                prefix: "a".into(),
                matches: vec![],
            },
            2,
        ),
        (beads_core::Error::CycleDetected("blocks".into()), 3),
        (beads_core::Error::IdInUse("bd-a".into()), 3),
        (beads_core::Error::Locked("busy".into()), 4),
        (beads_core::Error::Corrupt("bad db".into()), 4),
    ];

    for (err, code) in cases {
        assert_eq!(Error::Core(err).exit_code(), code);
    }
}

#[test]
fn test_rpc_errors_map_like_local_ones() {
    let err = Error::Rpc {
        code: ErrorCode::NotFound,
        message: "issue not found".into(),
    };
    assert_eq!(err.exit_code(), 2);

    let err = Error::Rpc {
        code: ErrorCode::Conflict,
        message: "cycle".into(),
    };
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_usage_errors_are_user_errors() {
    assert_eq!(Error::Usage("bad flag".into()).exit_code(), 1);
}
