// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::Utc;

#[test]
fn test_issue_type_roundtrip() {
    for t in [
        IssueType::Bug,
        IssueType::Feature,
        IssueType::Task,
        IssueType::Epic,
        IssueType::Chore,
    ] {
        assert_eq!(t.as_str().parse::<IssueType>().unwrap(), t);
    }
}

#[test]
fn test_issue_type_rejects_unknown() {
    assert!("story".parse::<IssueType>().is_err());
}

#[test]
fn test_status_roundtrip() {
    for s in [
        Status::Open,
        Status::InProgress,
        Status::Blocked,
        Status::Closed,
    ] {
        assert_eq!(s.as_str().parse::<Status>().unwrap(), s);
    }
}

#[test]
fn test_status_workable() {
    assert!(Status::Open.is_workable());
    assert!(Status::InProgress.is_workable());
    assert!(!Status::Blocked.is_workable());
    assert!(!Status::Closed.is_workable());
}

#[test]
fn test_dep_type_parses_underscore_aliases() {
    assert_eq!(
        "parent_child".parse::<DepType>().unwrap(),
        DepType::ParentChild
    );
    assert_eq!(
        "discovered_from".parse::<DepType>().unwrap(),
        DepType::DiscoveredFrom
    );
}

#[test]
fn test_dep_type_acyclic_classes() {
    assert!(DepType::Blocks.is_acyclic());
    assert!(DepType::ParentChild.is_acyclic());
    assert!(!DepType::Related.is_acyclic());
    assert!(!DepType::DiscoveredFrom.is_acyclic());
}

#[test]
fn test_parse_priority_names() {
    assert_eq!(parse_priority("0").unwrap(), 0);
    assert_eq!(parse_priority("highest").unwrap(), 0);
    assert_eq!(parse_priority("medium").unwrap(), 2);
    assert_eq!(parse_priority("lowest").unwrap(), 4);
    assert!(parse_priority("5").is_err());
    assert!(parse_priority("urgent").is_err());
}

#[test]
fn test_new_issue_defaults() {
    let now = Utc::now();
    let issue = Issue::new("bd-a3f8".into(), IssueType::Task, "Title".into(), now);
    assert_eq!(issue.status, Status::Open);
    assert_eq!(issue.priority, 2);
    assert_eq!(issue.created_at, issue.updated_at);
    assert!(issue.closed_at.is_none());
}

#[test]
fn test_issue_serde_skips_empty_options() {
    let now = Utc::now();
    let issue = Issue::new("bd-a3f8".into(), IssueType::Bug, "Title".into(), now);
    let json = serde_json::to_string(&issue).unwrap();
    assert!(!json.contains("description"));
    assert!(!json.contains("closed_at"));
    assert!(json.contains("\"status\":\"open\""));
}

#[test]
fn test_event_builder() {
    let ev = Event::new("bd-a3f8".into(), EventKind::StatusChanged, "alice".into())
        .with_values(Some("open".into()), Some("closed".into()));
    assert_eq!(ev.before.as_deref(), Some("open"));
    assert_eq!(ev.after.as_deref(), Some("closed"));
    assert_eq!(ev.kind, EventKind::StatusChanged);
}
