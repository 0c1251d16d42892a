// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_request_roundtrip_through_framing() {
    let request = Request::Create {
        new: NewIssueWire {
            title: "Framed".into(),
            priority: Some(1),
            ..NewIssueWire::default()
        },
        actor: "alice".into(),
    };

    let mut buf = Vec::new();
    framing::write_request(&mut buf, &request).unwrap();

    // 4-byte length prefix, big endian
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    assert_eq!(len, buf.len() - 4);

    let decoded = framing::read_request(&mut buf.as_slice()).unwrap();
    match decoded {
        Request::Create { new, actor } => {
            assert_eq!(new.title, "Framed");
            assert_eq!(new.priority, Some(1));
            assert_eq!(actor, "alice");
        }
        other => panic!("wrong variant: {other:?}"),
    }
}

#[test]
fn test_response_roundtrip_through_framing() {
    let response = Response::ResolvedId("bd-a3f8".into());

    let mut buf = Vec::new();
    framing::write_response(&mut buf, &response).unwrap();
    let decoded = framing::read_response(&mut buf.as_slice()).unwrap();

    match decoded {
        Response::ResolvedId(id) => assert_eq!(id, "bd-a3f8"),
        other => panic!("wrong variant: {other:?}"),
    }
}

#[test]
fn test_oversized_frame_rejected() {
    let mut buf = Vec::new();
    let bogus_len = (framing::MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes();
    buf.extend_from_slice(&bogus_len);
    buf.extend_from_slice(b"ignored");

    assert!(framing::read_response(&mut buf.as_slice()).is_err());
}

#[test]
fn test_error_code_mapping() {
    let err = beads_core::Error::IssueNotFound("bd-aaaa".into());
    match Response::from_error(&err) {
        Response::Error { code, message } => {
            assert_eq!(code, ErrorCode::NotFound);
            assert!(message.contains("bd-aaaa"));
        }
        other => panic!("wrong variant: {other:?}"),
    }

    let err = beads_core::Error::Locked("busy".into());
    match Response::from_error(&err) {
        Response::Error { code, .. } => assert_eq!(code, ErrorCode::Locked),
        other => panic!("wrong variant: {other:?}"),
    }
}

#[test]
fn test_wire_conversions_apply_defaults() {
    let new: beads_core::NewIssue = NewIssueWire {
        title: "Defaults".into(),
        ..NewIssueWire::default()
    }
    .into();
    assert_eq!(new.priority, 2);
    assert_eq!(new.issue_type, beads_core::IssueType::Task);

    let filter: beads_core::IssueFilter = FilterWire::default().into();
    assert!(filter.status.is_none());
    assert!(filter.labels.is_empty());
}

#[test]
fn test_requests_serialize_with_type_tag() {
    let json = serde_json::to_string(&Request::Ping).unwrap();
    assert_eq!(json, r#"{"type":"ping"}"#);

    let json = serde_json::to_string(&Request::ResolveId {
        input: "af78".into(),
    })
    .unwrap();
    assert!(json.contains(r#""type":"resolve_id""#));
}
