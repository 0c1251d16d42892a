// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Optional git integration: commit the journal after a flush.
//!
//! Enabled by the `git_commit` config key when the journal lives inside a
//! git repository. Every git failure is logged and swallowed; version
//! control must never take the tracker down.

use std::path::{Path, PathBuf};
use std::process::Command;

use beads_core::db::Store;

/// Commit message used for journal updates.
const COMMIT_MESSAGE: &str = "bd: update issue journal";

/// Handle to the enclosing repository, if committing is enabled.
pub struct GitBridge {
    repo_root: Option<PathBuf>,
}

impl GitBridge {
    /// Detect the enclosing repository and read the `git_commit` config
    /// key. Returns a disabled bridge unless both line up.
    pub fn detect(store: &Store, journal_path: &Path) -> Self {
        let enabled = store
            .get_config("git_commit")
            .ok()
            .flatten()
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if !enabled {
            return GitBridge { repo_root: None };
        }

        let dir = journal_path.parent().unwrap_or(Path::new("."));
        let repo_root = repo_toplevel(dir);
        if repo_root.is_none() {
            tracing::warn!("git_commit is set but the journal is not inside a git repository");
        }
        GitBridge { repo_root }
    }

    /// A bridge that never commits (used when no store is at hand).
    pub fn disabled() -> Self {
        GitBridge { repo_root: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.repo_root.is_some()
    }

    /// Stage and commit the journal if it changed. Failures are logged.
    pub fn commit_journal(&self, journal_path: &Path) {
        let Some(root) = &self.repo_root else { return };

        let add = Command::new("git")
            .arg("-C")
            .arg(root)
            .arg("add")
            .arg(journal_path)
            .output();
        if !matches!(&add, Ok(out) if out.status.success()) {
            tracing::warn!("git add failed for {}", journal_path.display());
            return;
        }

        // Anything staged? Skip the commit when the flush was a no-op
        let staged = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(["diff", "--cached", "--quiet", "--"])
            .arg(journal_path)
            .status();
        match staged {
            Ok(status) if status.success() => return, // no changes
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("git diff failed: {e}");
                return;
            }
        }

        let commit = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(["commit", "-m", COMMIT_MESSAGE])
            .output();
        match commit {
            Ok(out) if out.status.success() => {
                tracing::info!("committed journal update");
            }
            Ok(out) => {
                tracing::warn!(
                    "git commit failed: {}",
                    String::from_utf8_lossy(&out.stderr).trim()
                );
            }
            Err(e) => tracing::warn!("git commit failed: {e}"),
        }
    }
}

/// The repository root containing `dir`, if any.
fn repo_toplevel(dir: &Path) -> Option<PathBuf> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()?;

    if output.status.success() {
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !root.is_empty() {
            return Some(PathBuf::from(root));
        }
    }
    None
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
