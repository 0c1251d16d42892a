// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::issue::Event;

use super::{parse_db, parse_timestamp, Store};

/// Insert an event row. Callers are responsible for transaction scope.
pub(crate) fn log_event_tx(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (issue_id, kind, actor, before_value, after_value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.issue_id,
            event.kind.as_str(),
            event.actor,
            event.before,
            event.after,
            event.created_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    let kind_str: String = row.get(2)?;
    let created_str: String = row.get(6)?;
    Ok(Event {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        kind: parse_db(&kind_str, "kind")?,
        actor: row.get(3)?,
        before: row.get(4)?,
        after: row.get(5)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

impl Store {
    /// Log an event outside any other transaction.
    pub fn log_event(&self, event: &Event) -> Result<i64> {
        log_event_tx(&self.conn, event)
    }

    /// Get all events for an issue in commit order.
    pub fn get_events(&self, issue_id: &str) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, kind, actor, before_value, after_value, created_at
             FROM events WHERE issue_id = ?1 ORDER BY id",
        )?;

        let events = stmt
            .query_map(params![issue_id], row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(events)
    }

    /// Get recent events across all issues, newest first.
    pub fn get_recent_events(&self, limit: usize) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, kind, actor, before_value, after_value, created_at
             FROM events ORDER BY id DESC LIMIT ?1",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let events = stmt
            .query_map(params![limit_i64], row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(events)
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
