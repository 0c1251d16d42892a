// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The dirty set: issue IDs whose current state has not yet been emitted
//! to the journal. Populated on every mutation, drained on flush.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::Result;

use super::Store;

/// Mark an issue dirty. Callers are responsible for transaction scope.
pub(crate) fn mark_dirty_tx(conn: &Connection, issue_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO dirty_issues (issue_id, marked_at) VALUES (?1, ?2)
         ON CONFLICT(issue_id) DO UPDATE SET marked_at = excluded.marked_at",
        params![issue_id, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl Store {
    /// Mark an issue as not yet written to the journal.
    pub fn mark_dirty(&mut self, issue_id: &str) -> Result<()> {
        mark_dirty_tx(&self.conn, issue_id)
    }

    /// IDs currently in the dirty set.
    pub fn dirty_issue_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT issue_id FROM dirty_issues ORDER BY issue_id")?;

        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(ids)
    }

    /// Number of issues awaiting a flush.
    pub fn dirty_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dirty_issues", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Remove and return the dirty set. Called after a successful flush.
    pub fn drain_dirty(&mut self) -> Result<Vec<String>> {
        let tx = self.write_tx()?;
        let ids = {
            let mut stmt = tx.prepare("SELECT issue_id FROM dirty_issues ORDER BY issue_id")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            rows
        };
        tx.execute("DELETE FROM dirty_issues", [])?;
        tx.commit()?;
        Ok(ids)
    }
}

#[cfg(test)]
#[path = "dirty_tests.rs"]
mod tests;
