// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use rusqlite::params;

use crate::error::{Error, Result};
use crate::issue::{Comment, Event, EventKind};

use super::{parse_timestamp, Store};

impl Store {
    /// Append a comment to an issue. Comments are immutable once written.
    pub fn add_comment(&mut self, issue_id: &str, author: &str, text: &str) -> Result<i64> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("comment must not be empty".into()));
        }

        let tx = self.write_tx()?;
        if !super::issues::issue_exists_tx(&tx, issue_id)? {
            return Err(Error::IssueNotFound(issue_id.to_string()));
        }

        tx.execute(
            "INSERT INTO comments (issue_id, author, text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![issue_id, author, text, Utc::now().to_rfc3339()],
        )?;
        let comment_id = tx.last_insert_rowid();

        let event = Event::new(issue_id.to_string(), EventKind::Commented, author.to_string());
        super::events::log_event_tx(&tx, &event)?;
        super::dirty::mark_dirty_tx(&tx, issue_id)?;

        tx.commit()?;
        Ok(comment_id)
    }

    /// Get all comments for an issue, oldest first.
    pub fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, author, text, created_at
             FROM comments WHERE issue_id = ?1 ORDER BY created_at, id",
        )?;

        let comments = stmt
            .query_map(params![issue_id], |row| {
                let created_str: String = row.get(4)?;
                Ok(Comment {
                    id: row.get(0)?,
                    issue_id: row.get(1)?,
                    author: row.get(2)?,
                    text: row.get(3)?,
                    created_at: parse_timestamp(&created_str, "created_at")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
