// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! AutoFlush: write the journal when dirty state has settled.
//!
//! The server loop schedules a flush a short delay after the dirty set
//! becomes non-empty, coalescing further mutations into one write. The
//! write is atomic (temp file, fsync, rename); the dirty set is cleared
//! only after the write lands.

use beads_core::db::Store;
use beads_core::error::Result;
use beads_core::journal;
use beads_core::paths::BeadsPaths;

use crate::git::GitBridge;

/// Write the journal from the store, clear the dirty set, and hand the
/// change to the git bridge. A clean store is a no-op.
pub fn flush(store: &mut Store, paths: &BeadsPaths, git: &GitBridge) -> Result<()> {
    let dirty = store.dirty_count()?;
    if dirty == 0 {
        return Ok(());
    }

    let journal_path = paths.journal_path();
    journal::export(store, &journal_path)?;
    let drained = store.drain_dirty()?;
    tracing::info!(
        "flushed {} dirty issues to {}",
        drained.len(),
        journal_path.display()
    );

    git.commit_journal(&journal_path);
    Ok(())
}

#[cfg(test)]
#[path = "flush_tests.rs"]
mod tests;
