// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_file_layout() {
    let paths = BeadsPaths::at(PathBuf::from("/tmp/.beads"));
    assert_eq!(paths.db_path(), PathBuf::from("/tmp/.beads/beads.db"));
    assert_eq!(
        paths.journal_path(),
        PathBuf::from("/tmp/.beads/issues.jsonl")
    );
    assert_eq!(paths.socket_path(), PathBuf::from("/tmp/.beads/daemon.sock"));
    assert_eq!(paths.lock_path(), PathBuf::from("/tmp/.beads/daemon.lock"));
}

#[test]
fn test_from_db_path() {
    let paths = BeadsPaths::from_db_path(Path::new("/work/proj/.beads/beads.db"));
    assert_eq!(paths.state_dir, PathBuf::from("/work/proj/.beads"));
}

#[test]
fn test_discover_walks_upward() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join(".beads");
    std::fs::create_dir(&state).unwrap();
    let nested = dir.path().join("src").join("deep");
    std::fs::create_dir_all(&nested).unwrap();

    let paths = BeadsPaths::discover(&nested).unwrap();
    assert_eq!(paths.state_dir, state);
}

#[test]
fn test_discover_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    assert!(BeadsPaths::discover(dir.path()).is_err());
}

#[test]
fn test_backup_copies_database() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join(".beads");
    std::fs::create_dir(&state).unwrap();
    let paths = BeadsPaths::at(state);
    std::fs::write(paths.db_path(), b"database bytes").unwrap();

    let backup = paths.backup_db().unwrap();
    assert!(backup.exists());
    assert_eq!(std::fs::read(&backup).unwrap(), b"database bytes");
    let name = backup.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("beads.backup-"));
    assert!(name.ends_with(".db"));
}
