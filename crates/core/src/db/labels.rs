// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rusqlite::params;

use crate::error::{Error, Result};
use crate::issue::{Event, EventKind};

use super::Store;

impl Store {
    /// Add a label to an issue. Adding an existing label is a no-op.
    pub fn add_label(&mut self, issue_id: &str, label: &str, actor: &str) -> Result<()> {
        if label.trim().is_empty() {
            return Err(Error::InvalidInput("label must not be empty".into()));
        }

        let tx = self.write_tx()?;
        if !super::issues::issue_exists_tx(&tx, issue_id)? {
            return Err(Error::IssueNotFound(issue_id.to_string()));
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO labels (issue_id, label) VALUES (?1, ?2)",
            params![issue_id, label],
        )?;

        if inserted > 0 {
            let event = Event::new(issue_id.to_string(), EventKind::LabelAdded, actor.to_string())
                .with_values(None, Some(label.to_string()));
            super::events::log_event_tx(&tx, &event)?;
            super::dirty::mark_dirty_tx(&tx, issue_id)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Remove a label from an issue. Returns false if it was absent.
    pub fn remove_label(&mut self, issue_id: &str, label: &str, actor: &str) -> Result<bool> {
        let tx = self.write_tx()?;

        let affected = tx.execute(
            "DELETE FROM labels WHERE issue_id = ?1 AND label = ?2",
            params![issue_id, label],
        )?;

        if affected > 0 {
            let event = Event::new(
                issue_id.to_string(),
                EventKind::LabelRemoved,
                actor.to_string(),
            )
            .with_values(Some(label.to_string()), None);
            super::events::log_event_tx(&tx, &event)?;
            super::dirty::mark_dirty_tx(&tx, issue_id)?;
        }

        tx.commit()?;
        Ok(affected > 0)
    }

    /// Get all labels for an issue, sorted.
    pub fn get_labels(&self, issue_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT label FROM labels WHERE issue_id = ?1 ORDER BY label")?;

        let labels = stmt
            .query_map(params![issue_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(labels)
    }

    /// Every distinct label in the store with its usage count.
    pub fn list_all_labels(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT label, COUNT(*) FROM labels GROUP BY label ORDER BY label",
        )?;

        let labels = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(labels)
    }
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod tests;
