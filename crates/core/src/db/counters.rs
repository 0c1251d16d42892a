// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-parent monotonic child counters.
//!
//! The next child of parent P is `counter(P) + 1`; the increment happens
//! inside the transaction that inserts the child, so concurrent creators
//! each observe a distinct value. Counters never go backwards, even when
//! children are deleted; gaps are permitted and stable.

use rusqlite::{params, Connection};

use crate::error::Result;

use super::Store;

/// Atomically increment and return the child counter for `parent_id`.
///
/// Runs as read-modify-write on a single row (`ON CONFLICT .. DO UPDATE ..
/// RETURNING`), which is serialised by the enclosing write transaction.
pub(crate) fn next_child_number(conn: &Connection, parent_id: &str) -> Result<i64> {
    let n: i64 = conn.query_row(
        "INSERT INTO child_counters (parent_id, counter) VALUES (?1, 1)
         ON CONFLICT(parent_id) DO UPDATE SET counter = counter + 1
         RETURNING counter",
        params![parent_id],
        |row| row.get(0),
    )?;
    Ok(n)
}

/// Ensure a counter is at least `floor` (used by import and migration so
/// pre-assigned child suffixes are never reissued).
pub(crate) fn raise_counter_to(conn: &Connection, parent_id: &str, floor: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO child_counters (parent_id, counter) VALUES (?1, ?2)
         ON CONFLICT(parent_id) DO UPDATE SET counter = MAX(counter, excluded.counter)",
        params![parent_id, floor],
    )?;
    Ok(())
}

impl Store {
    /// Current counter value for a parent (0 if no children ever existed).
    pub fn child_counter(&self, parent_id: &str) -> Result<i64> {
        use rusqlite::OptionalExtension;
        let n = self
            .conn
            .query_row(
                "SELECT counter FROM child_counters WHERE parent_id = ?1",
                params![parent_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(n.unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "counters_tests.rs"]
mod tests;
