// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency edges: insertion with cycle rejection, removal, and the
//! graph queries the planner builds on.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::issue::{DepType, Dependency, Event, EventKind};

use super::{parse_db, parse_timestamp, Store};

/// Map a row to a Dependency.
///
/// Expected columns: from_id, to_id, dep_type, created_at
fn row_to_dependency(row: &rusqlite::Row) -> rusqlite::Result<Dependency> {
    let type_str: String = row.get(2)?;
    let created_str: String = row.get(3)?;
    Ok(Dependency {
        from_id: row.get(0)?,
        to_id: row.get(1)?,
        dep_type: parse_db(&type_str, "dep_type")?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

impl Store {
    /// Add a dependency between two issues.
    ///
    /// Rejects self-edges, edges to unknown issues, second parents, and any
    /// `blocks` or `parent-child` edge that would close a cycle.
    pub fn add_dependency(
        &mut self,
        from_id: &str,
        to_id: &str,
        dep_type: DepType,
        actor: &str,
    ) -> Result<()> {
        if from_id == to_id {
            return Err(Error::SelfDependency);
        }

        let tx = self.write_tx()?;

        for id in [from_id, to_id] {
            if !super::issues::issue_exists_tx(&tx, id)? {
                return Err(Error::IssueNotFound(id.to_string()));
            }
        }

        if dep_type == DepType::ParentChild && parent_of(&tx, from_id)?.is_some() {
            return Err(Error::ParentExists(from_id.to_string()));
        }

        if dep_type.is_acyclic() && would_create_cycle(&tx, from_id, to_id, dep_type)? {
            return Err(Error::CycleDetected(dep_type.to_string()));
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO deps (from_id, to_id, dep_type, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![from_id, to_id, dep_type.as_str(), Utc::now().to_rfc3339()],
        )?;

        if inserted > 0 {
            let event = Event::new(
                from_id.to_string(),
                EventKind::DependencyAdded,
                actor.to_string(),
            )
            .with_values(None, Some(format!("{dep_type} {to_id}")));
            super::events::log_event_tx(&tx, &event)?;
            super::dirty::mark_dirty_tx(&tx, from_id)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Remove a dependency between two issues.
    pub fn remove_dependency(
        &mut self,
        from_id: &str,
        to_id: &str,
        dep_type: DepType,
        actor: &str,
    ) -> Result<()> {
        let tx = self.write_tx()?;

        let affected = tx.execute(
            "DELETE FROM deps WHERE from_id = ?1 AND to_id = ?2 AND dep_type = ?3",
            params![from_id, to_id, dep_type.as_str()],
        )?;

        if affected == 0 {
            return Err(Error::DependencyNotFound {
                from: from_id.to_string(),
                dep_type: dep_type.to_string(),
                to: to_id.to_string(),
            });
        }

        let event = Event::new(
            from_id.to_string(),
            EventKind::DependencyRemoved,
            actor.to_string(),
        )
        .with_values(Some(format!("{dep_type} {to_id}")), None);
        super::events::log_event_tx(&tx, &event)?;
        super::dirty::mark_dirty_tx(&tx, from_id)?;

        tx.commit()?;
        Ok(())
    }

    /// Get all dependencies from an issue.
    pub fn get_deps_from(&self, from_id: &str) -> Result<Vec<Dependency>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id, to_id, dep_type, created_at FROM deps
             WHERE from_id = ?1 ORDER BY to_id, dep_type",
        )?;

        let deps = stmt
            .query_map(params![from_id], row_to_dependency)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(deps)
    }

    /// Get all dependencies pointing at an issue.
    pub fn get_deps_to(&self, to_id: &str) -> Result<Vec<Dependency>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id, to_id, dep_type, created_at FROM deps
             WHERE to_id = ?1 ORDER BY from_id, dep_type",
        )?;

        let deps = stmt
            .query_map(params![to_id], row_to_dependency)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(deps)
    }

    /// Get every dependency edge in the store.
    pub fn get_all_deps(&self) -> Result<Vec<Dependency>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id, to_id, dep_type, created_at FROM deps
             ORDER BY from_id, to_id, dep_type",
        )?;

        let deps = stmt
            .query_map([], row_to_dependency)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(deps)
    }

    /// Issues that block the given issue and are not closed.
    pub fn get_open_blockers(&self, issue_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.from_id FROM deps d JOIN issues i ON i.id = d.from_id
             WHERE d.to_id = ?1 AND d.dep_type = 'blocks' AND i.status != 'closed'
             ORDER BY d.from_id",
        )?;

        let ids = stmt
            .query_map(params![issue_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(ids)
    }

    /// IDs of issues with at least one open blocker.
    pub fn get_blocked_issue_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT d.to_id FROM deps d
             JOIN issues i ON i.id = d.from_id
             WHERE d.dep_type = 'blocks' AND i.status != 'closed'",
        )?;

        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(ids)
    }

    /// The parent of a hierarchical child, if any.
    pub fn get_parent(&self, issue_id: &str) -> Result<Option<String>> {
        parent_of(&self.conn, issue_id)
    }

    /// Hierarchical children of an issue, in ID order.
    pub fn get_children(&self, parent_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id FROM deps WHERE to_id = ?1 AND dep_type = 'parent-child'
             ORDER BY from_id",
        )?;

        let ids = stmt
            .query_map(params![parent_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(ids)
    }
}

/// The parent-child edge is functional on the child side.
pub(crate) fn parent_of(conn: &Connection, issue_id: &str) -> Result<Option<String>> {
    use rusqlite::OptionalExtension;
    let parent = conn
        .query_row(
            "SELECT to_id FROM deps WHERE from_id = ?1 AND dep_type = 'parent-child'",
            params![issue_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(parent)
}

/// Check if adding from_id -> to_id of the given type would close a cycle.
/// Uses a recursive CTE to test whether to_id already reaches from_id.
pub(crate) fn would_create_cycle(
    conn: &Connection,
    from_id: &str,
    to_id: &str,
    dep_type: DepType,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        "WITH RECURSIVE chain(id) AS (
            SELECT to_id FROM deps WHERE from_id = ?1 AND dep_type = ?3
            UNION
            SELECT d.to_id FROM deps d JOIN chain c ON d.from_id = c.id
            WHERE d.dep_type = ?3
        )
        SELECT COUNT(*) FROM chain WHERE id = ?2",
        params![to_id, from_id, dep_type.as_str()],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
