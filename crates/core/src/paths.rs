// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Layout of the `.beads/` state directory.
//!
//! A project's tracker state lives in a `.beads/` directory discovered by
//! walking upward from the working directory, the same way git finds its
//! repository root. `BEADS_DB` overrides the database path directly.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Error, Result};

/// Directory name holding all tracker state.
pub const STATE_DIR: &str = ".beads";
/// Database filename within the state directory.
pub const DB_NAME: &str = "beads.db";
/// Journal filename within the state directory.
pub const JOURNAL_NAME: &str = "issues.jsonl";
/// Socket filename within the state directory.
pub const SOCKET_NAME: &str = "daemon.sock";
/// PID filename within the state directory.
pub const PID_NAME: &str = "daemon.pid";
/// Lock filename for the single-daemon guarantee.
pub const LOCK_NAME: &str = "daemon.lock";
/// Daemon log filename within the state directory.
pub const LOG_NAME: &str = "daemon.log";
/// Audit mapping written by migrate-hash-ids.
pub const MAPPING_NAME: &str = "hash-id-mapping.json";

/// Resolved locations of the tracker's on-disk state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeadsPaths {
    /// The `.beads` directory itself.
    pub state_dir: PathBuf,
}

impl BeadsPaths {
    /// Paths rooted at an explicit state directory.
    pub fn at(state_dir: PathBuf) -> Self {
        BeadsPaths { state_dir }
    }

    /// Resolve from an explicit database path (`--db` or `BEADS_DB`):
    /// the state directory is the database's parent.
    pub fn from_db_path(db: &Path) -> Self {
        let state_dir = db
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        BeadsPaths { state_dir }
    }

    /// Discover the state directory by walking upward from `start`.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join(STATE_DIR);
            if candidate.is_dir() {
                return Ok(BeadsPaths {
                    state_dir: candidate,
                });
            }
            dir = d.parent();
        }
        Err(Error::InvalidInput(format!(
            "no {STATE_DIR} directory found above {}\n  hint: run 'bd init' first",
            start.display()
        )))
    }

    /// Resolve using, in order: an explicit `--db` path, `BEADS_DB`, then
    /// upward discovery from the current directory.
    pub fn resolve(db_flag: Option<&Path>) -> Result<Self> {
        if let Some(db) = db_flag {
            return Ok(Self::from_db_path(db));
        }
        if let Ok(db) = std::env::var("BEADS_DB") {
            if !db.is_empty() {
                return Ok(Self::from_db_path(Path::new(&db)));
            }
        }
        let cwd = std::env::current_dir()?;
        Self::discover(&cwd)
    }

    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join(DB_NAME)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.state_dir.join(JOURNAL_NAME)
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_dir.join(SOCKET_NAME)
    }

    pub fn pid_path(&self) -> PathBuf {
        self.state_dir.join(PID_NAME)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join(LOCK_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join(LOG_NAME)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.state_dir.join(MAPPING_NAME)
    }

    /// Copy the database aside before a destructive operation.
    /// Returns the backup path.
    pub fn backup_db(&self) -> Result<PathBuf> {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let backup = self.state_dir.join(format!("beads.backup-{stamp}.db"));
        std::fs::copy(self.db_path(), &backup)?;
        Ok(backup)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
