// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::{NewIssue, Store};

#[test]
fn test_validate_prefix() {
    assert!(validate_prefix("bd"));
    assert!(validate_prefix("proj2"));
    assert!(!validate_prefix("b"));
    assert!(!validate_prefix("BD"));
    assert!(!validate_prefix("42"));
    assert!(!validate_prefix("has-dash"));
}

#[test]
fn test_is_hash_id() {
    assert!(is_hash_id("bd-a3f8"));
    assert!(is_hash_id("bd-a3f8.1"));
    assert!(!is_hash_id("bd-12"));
    assert!(!is_hash_id("bd-12.3"));
    assert!(!is_hash_id("nodash"));
}

#[test]
fn test_child_id_helpers() {
    assert!(is_child_id("bd-a3f8.1"));
    assert!(is_child_id("bd-a3f8.1.2"));
    assert!(!is_child_id("bd-a3f8"));

    assert_eq!(parent_id_of("bd-a3f8.1"), Some("bd-a3f8"));
    assert_eq!(parent_id_of("bd-a3f8.1.2"), Some("bd-a3f8.1"));
    assert_eq!(parent_id_of("bd-a3f8"), None);
}

#[test]
fn test_collision_probability_shape() {
    // Empty and single-ID databases never collide
    assert_eq!(collision_probability(0, 4), 0.0);
    assert_eq!(collision_probability(1, 4), 0.0);

    // ~7% for 100 IDs in a 16^4 space
    let p100 = collision_probability(100, 4);
    assert!((0.05..0.10).contains(&p100), "p100 = {p100}");

    // The 25% threshold for 4 hex sits between 194 and 195 IDs
    assert!(collision_probability(194, 4) <= 0.25);
    assert!(collision_probability(195, 4) > 0.25);

    // Monotone in n, anti-monotone in length
    assert!(collision_probability(1000, 4) > collision_probability(500, 4));
    assert!(collision_probability(1000, 5) < collision_probability(1000, 4));
}

#[test]
fn test_pick_hash_length_grows_with_database() {
    let cfg = crate::db::config::IdConfig {
        prefix: "bd".into(),
        max_collision_prob: 0.25,
        min_hash_length: 4,
        max_hash_length: 12,
    };
    assert_eq!(pick_hash_length(0, &cfg), 4);
    assert_eq!(pick_hash_length(150, &cfg), 4);
    assert_eq!(pick_hash_length(500, &cfg), 5);
    assert_eq!(pick_hash_length(1_000, &cfg), 6);
    assert_eq!(pick_hash_length(10_000, &cfg), 7);
}

#[test]
fn test_pick_hash_length_respects_min() {
    let cfg = crate::db::config::IdConfig {
        prefix: "bd".into(),
        max_collision_prob: 0.25,
        min_hash_length: 6,
        max_hash_length: 12,
    };
    assert_eq!(pick_hash_length(0, &cfg), 6);
}

#[test]
fn test_hash_is_deterministic() {
    let now = chrono::Utc::now();
    let a = hash_content("Title", Some("desc"), "alice", now, 0);
    let b = hash_content("Title", Some("desc"), "alice", now, 0);
    assert_eq!(hash_hex(&a, 8), hash_hex(&b, 8));

    let c = hash_content("Title", Some("desc"), "alice", now, 1);
    assert_ne!(hash_hex(&a, 8), hash_hex(&c, 8));
}

#[test]
fn test_allocated_ids_match_configured_prefix_and_length() {
    let mut store = Store::open_in_memory().unwrap();
    store.set_config("issue_prefix", "test").unwrap();

    for i in 0..50 {
        let issue = store
            .create_issue(
                &NewIssue {
                    title: format!("Distinct issue number {i}"),
                    ..NewIssue::default()
                },
                "tester",
            )
            .unwrap();
        let hash = issue.id.strip_prefix("test-").unwrap();
        assert_eq!(hash.len(), 4, "unexpected length for {}", issue.id);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_min_hash_length_config_is_honoured() {
    let mut store = Store::open_in_memory().unwrap();
    store.set_config("issue_prefix", "test").unwrap();
    store.set_config("min_hash_length", "5").unwrap();

    for i in 0..20 {
        let issue = store
            .create_issue(
                &NewIssue {
                    title: format!("Issue {i}"),
                    ..NewIssue::default()
                },
                "tester",
            )
            .unwrap();
        let hash = issue.id.strip_prefix("test-").unwrap();
        assert!(hash.len() >= 5, "{} too short", issue.id);
    }
}

#[test]
fn test_no_duplicates_across_many_allocations() {
    let mut store = Store::open_in_memory().unwrap();
    store.set_config("issue_prefix", "test").unwrap();

    let mut seen = std::collections::HashSet::new();
    for i in 0..1050 {
        let issue = store
            .create_issue(
                &NewIssue {
                    title: format!("Bulk issue {i}"),
                    ..NewIssue::default()
                },
                "tester",
            )
            .unwrap();
        assert!(seen.insert(issue.id.clone()), "duplicate id {}", issue.id);

        let hash = issue.id.strip_prefix("test-").unwrap();
        assert!(
            (4..=6).contains(&hash.len()),
            "length drifted out of range: {}",
            issue.id
        );
    }
}
