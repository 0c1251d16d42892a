// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::process::Command;

fn init_repo(dir: &Path) {
    for args in [
        vec!["init", "-q"],
        vec!["config", "user.email", "test@test.invalid"],
        vec!["config", "user.name", "Test User"],
    ] {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(&args)
            .status()
            .unwrap();
        assert!(status.success());
    }
}

#[test]
fn test_repo_toplevel_detection() {
    let dir = tempfile::tempdir().unwrap();
    assert!(repo_toplevel(dir.path()).is_none());

    init_repo(dir.path());
    let top = repo_toplevel(dir.path()).unwrap();
    assert_eq!(
        top.canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn test_bridge_disabled_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("beads.db")).unwrap();
    let bridge = GitBridge::detect(&store, &dir.path().join("issues.jsonl"));
    assert!(!bridge.is_enabled());
}

#[test]
fn test_commit_journal_creates_commit() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());

    let mut store = Store::open(&dir.path().join("beads.db")).unwrap();
    store.set_config("git_commit", "true").unwrap();

    let journal = dir.path().join("issues.jsonl");
    std::fs::write(&journal, "{}\n").unwrap();

    let bridge = GitBridge::detect(&store, &journal);
    assert!(bridge.is_enabled());
    bridge.commit_journal(&journal);

    let log = Command::new("git")
        .arg("-C")
        .arg(dir.path())
        .args(["log", "--oneline"])
        .output()
        .unwrap();
    let log = String::from_utf8_lossy(&log.stdout).into_owned();
    assert!(log.contains("bd: update issue journal"), "log: {log}");

    // A second commit attempt with no changes is a no-op
    bridge.commit_journal(&journal);
    let log2 = Command::new("git")
        .arg("-C")
        .arg(dir.path())
        .args(["rev-list", "--count", "HEAD"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&log2.stdout).trim(), "1");
}

#[test]
fn test_disabled_bridge_never_touches_git() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = GitBridge::disabled();
    // Must not panic or create anything
    bridge.commit_journal(&dir.path().join("issues.jsonl"));
    assert!(!dir.path().join(".git").exists());
}
