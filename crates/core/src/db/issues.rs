// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Issue CRUD, filtered listing, prefix resolution, and `update_id`.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::id;
use crate::issue::{Event, EventKind, Issue, IssueType, Status};

use super::{parse_db, parse_timestamp, parse_timestamp_opt, Store};

/// Column list shared by every issue SELECT.
pub(crate) const ISSUE_COLUMNS: &str = "id, title, description, design, notes, \
     acceptance_criteria, status, priority, issue_type, assignee, external_ref, \
     source_location, estimate, created_at, updated_at, closed_at";

/// Map a row (in `ISSUE_COLUMNS` order) to an Issue.
pub(crate) fn row_to_issue(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    let status_str: String = row.get(6)?;
    let type_str: String = row.get(8)?;
    let created_str: String = row.get(13)?;
    let updated_str: String = row.get(14)?;
    let closed_str: Option<String> = row.get(15)?;
    let priority: i64 = row.get(7)?;

    Ok(Issue {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        design: row.get(3)?,
        notes: row.get(4)?,
        acceptance_criteria: row.get(5)?,
        status: parse_db(&status_str, "status")?,
        priority: priority as u8,
        issue_type: parse_db(&type_str, "issue_type")?,
        assignee: row.get(9)?,
        external_ref: row.get(10)?,
        source_location: row.get(11)?,
        estimate: row.get(12)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
        closed_at: parse_timestamp_opt(closed_str, "closed_at")?,
    })
}

/// Insert an issue row. Callers are responsible for transaction scope.
pub(crate) fn insert_issue_row(conn: &Connection, issue: &Issue) -> Result<()> {
    conn.execute(
        "INSERT INTO issues (id, title, description, design, notes, acceptance_criteria,
         status, priority, issue_type, assignee, external_ref, source_location, estimate,
         created_at, updated_at, closed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            issue.id,
            issue.title,
            issue.description,
            issue.design,
            issue.notes,
            issue.acceptance_criteria,
            issue.status.as_str(),
            issue.priority as i64,
            issue.issue_type.as_str(),
            issue.assignee,
            issue.external_ref,
            issue.source_location,
            issue.estimate,
            issue.created_at.to_rfc3339(),
            issue.updated_at.to_rfc3339(),
            issue.closed_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Fetch an issue inside an existing statement scope.
pub(crate) fn get_issue_row(conn: &Connection, id: &str) -> Result<Issue> {
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_issue)
        .optional()?
        .ok_or_else(|| Error::IssueNotFound(id.to_string()))
}

/// Fields for a new issue. The ID is allocated by the store.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub design: Option<String>,
    pub notes: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub priority: u8,
    pub issue_type: IssueType,
    pub assignee: Option<String>,
    pub external_ref: Option<String>,
    pub source_location: Option<String>,
    pub estimate: Option<i64>,
    /// When set, the issue becomes a hierarchical child of this parent.
    pub parent: Option<String>,
}

impl Default for NewIssue {
    fn default() -> Self {
        NewIssue {
            title: String::new(),
            description: None,
            design: None,
            notes: None,
            acceptance_criteria: None,
            priority: 2,
            issue_type: IssueType::Task,
            assignee: None,
            external_ref: None,
            source_location: None,
            estimate: None,
            parent: None,
        }
    }
}

/// Partial update of issue fields. `None` leaves a field unchanged; for
/// optional text fields an empty string clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub design: Option<String>,
    pub notes: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<u8>,
    pub issue_type: Option<IssueType>,
    pub assignee: Option<String>,
    pub external_ref: Option<String>,
    pub source_location: Option<String>,
    pub estimate: Option<i64>,
}

/// Filters for listing and searching issues.
///
/// Results are always ordered priority ascending, then created_at
/// ascending; pagination is offset+limit.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub issue_type: Option<IssueType>,
    pub priority_min: Option<u8>,
    pub priority_max: Option<u8>,
    /// Every listed label must be present on the issue.
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Aggregate counters returned by `Stats`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub closed: usize,
    pub dependencies: usize,
    pub labels: usize,
    pub comments: usize,
    pub dirty: usize,
}

impl Store {
    /// Create a new issue, allocating its ID inside the transaction.
    ///
    /// Top-level issues get an adaptive-length hash ID; when `parent` is
    /// set, the ID is `{parent}.{n}` from the parent's child counter and a
    /// parent-child dependency is inserted alongside.
    pub fn create_issue(&mut self, new: &NewIssue, actor: &str) -> Result<Issue> {
        if new.title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".into()));
        }
        if new.priority > 4 {
            return Err(Error::InvalidPriority(new.priority.to_string()));
        }

        let now = Utc::now();
        let tx = self.write_tx()?;

        let issue_id = match &new.parent {
            None => id::allocate_hash_id(&tx, &new.title, new.description.as_deref(), actor, now)?,
            Some(parent) => {
                if !issue_exists_tx(&tx, parent)? {
                    return Err(Error::IssueNotFound(parent.clone()));
                }
                let n = super::counters::next_child_number(&tx, parent)?;
                format!("{parent}.{n}")
            }
        };

        let mut issue = Issue::new(issue_id.clone(), new.issue_type, new.title.clone(), now);
        issue.description = new.description.clone();
        issue.design = new.design.clone();
        issue.notes = new.notes.clone();
        issue.acceptance_criteria = new.acceptance_criteria.clone();
        issue.priority = new.priority;
        issue.assignee = new.assignee.clone();
        issue.external_ref = new.external_ref.clone();
        issue.source_location = new.source_location.clone();
        issue.estimate = new.estimate;

        insert_issue_row(&tx, &issue)?;

        if let Some(parent) = &new.parent {
            tx.execute(
                "INSERT INTO deps (from_id, to_id, dep_type, created_at)
                 VALUES (?1, ?2, 'parent-child', ?3)",
                params![issue.id, parent, now.to_rfc3339()],
            )?;
        }

        let event = Event::new(issue.id.clone(), EventKind::Created, actor.to_string())
            .with_values(None, Some(issue.title.clone()));
        super::events::log_event_tx(&tx, &event)?;
        super::dirty::mark_dirty_tx(&tx, &issue.id)?;

        tx.commit()?;
        Ok(issue)
    }

    /// Get an issue by ID.
    pub fn get_issue(&self, id: &str) -> Result<Issue> {
        get_issue_row(&self.conn, id)
    }

    /// Check if an issue exists.
    pub fn issue_exists(&self, id: &str) -> Result<bool> {
        issue_exists_tx(&self.conn, id)
    }

    /// Apply a partial update, stamping `updated_at` and logging events.
    pub fn update_issue(&mut self, id: &str, patch: &UpdatePatch, actor: &str) -> Result<Issue> {
        let tx = self.write_tx()?;
        let old = get_issue_row(&tx, id)?;
        let mut issue = old.clone();
        let mut changed: Vec<&str> = Vec::new();

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title must not be empty".into()));
            }
            if *title != issue.title {
                issue.title = title.clone();
                changed.push("title");
            }
        }
        apply_text_field(&patch.description, &mut issue.description, "description", &mut changed);
        apply_text_field(&patch.design, &mut issue.design, "design", &mut changed);
        apply_text_field(&patch.notes, &mut issue.notes, "notes", &mut changed);
        apply_text_field(
            &patch.acceptance_criteria,
            &mut issue.acceptance_criteria,
            "acceptance_criteria",
            &mut changed,
        );
        apply_text_field(&patch.assignee, &mut issue.assignee, "assignee", &mut changed);
        apply_text_field(
            &patch.external_ref,
            &mut issue.external_ref,
            "external_ref",
            &mut changed,
        );
        apply_text_field(
            &patch.source_location,
            &mut issue.source_location,
            "source_location",
            &mut changed,
        );
        if let Some(p) = patch.priority {
            if p > 4 {
                return Err(Error::InvalidPriority(p.to_string()));
            }
            if p != issue.priority {
                issue.priority = p;
                changed.push("priority");
            }
        }
        if let Some(t) = patch.issue_type {
            if t != issue.issue_type {
                issue.issue_type = t;
                changed.push("issue_type");
            }
        }
        if let Some(e) = patch.estimate {
            if Some(e) != issue.estimate {
                issue.estimate = Some(e);
                changed.push("estimate");
            }
        }
        if let Some(s) = patch.status {
            if s != issue.status {
                let event = Event::new(id.to_string(), EventKind::StatusChanged, actor.to_string())
                    .with_values(
                        Some(issue.status.as_str().to_string()),
                        Some(s.as_str().to_string()),
                    );
                super::events::log_event_tx(&tx, &event)?;
                issue.status = s;
                issue.closed_at = if s.is_closed() { Some(Utc::now()) } else { None };
                changed.push("status");
            }
        }

        if changed.is_empty() {
            tx.commit()?;
            return Ok(issue);
        }

        issue.updated_at = Utc::now();
        write_issue_fields(&tx, &issue)?;

        if changed.iter().any(|f| *f != "status") {
            let event = Event::new(id.to_string(), EventKind::Updated, actor.to_string())
                .with_values(None, Some(changed.join(",")));
            super::events::log_event_tx(&tx, &event)?;
        }
        super::dirty::mark_dirty_tx(&tx, id)?;

        tx.commit()?;
        Ok(issue)
    }

    /// Close an issue, stamping `closed_at`.
    pub fn close_issue(&mut self, id: &str, actor: &str, reason: Option<&str>) -> Result<Issue> {
        let tx = self.write_tx()?;
        let mut issue = get_issue_row(&tx, id)?;
        if issue.status.is_closed() {
            tx.commit()?;
            return Ok(issue);
        }

        let before = issue.status;
        let now = Utc::now();
        issue.status = Status::Closed;
        issue.closed_at = Some(now);
        issue.updated_at = now;
        write_issue_fields(&tx, &issue)?;

        let event = Event::new(id.to_string(), EventKind::Closed, actor.to_string()).with_values(
            Some(before.as_str().to_string()),
            reason.map(|r| r.to_string()),
        );
        super::events::log_event_tx(&tx, &event)?;
        super::dirty::mark_dirty_tx(&tx, id)?;

        tx.commit()?;
        Ok(issue)
    }

    /// Reopen a closed issue, clearing `closed_at`.
    pub fn reopen_issue(&mut self, id: &str, actor: &str) -> Result<Issue> {
        let tx = self.write_tx()?;
        let mut issue = get_issue_row(&tx, id)?;
        if !issue.status.is_closed() {
            tx.commit()?;
            return Ok(issue);
        }

        issue.status = Status::Open;
        issue.closed_at = None;
        issue.updated_at = Utc::now();
        write_issue_fields(&tx, &issue)?;

        let event = Event::new(id.to_string(), EventKind::Reopened, actor.to_string())
            .with_values(Some(Status::Closed.as_str().to_string()), None);
        super::events::log_event_tx(&tx, &event)?;
        super::dirty::mark_dirty_tx(&tx, id)?;

        tx.commit()?;
        Ok(issue)
    }

    /// Delete an issue, cascading to dependencies, labels, comments, and
    /// events. The ID stays in the dirty set so the next flush drops the
    /// record from the journal.
    pub fn delete_issue(&mut self, id: &str) -> Result<()> {
        let tx = self.write_tx()?;
        if !issue_exists_tx(&tx, id)? {
            return Err(Error::IssueNotFound(id.to_string()));
        }

        tx.execute("DELETE FROM deps WHERE from_id = ?1 OR to_id = ?1", params![id])?;
        tx.execute("DELETE FROM labels WHERE issue_id = ?1", params![id])?;
        tx.execute("DELETE FROM comments WHERE issue_id = ?1", params![id])?;
        tx.execute("DELETE FROM events WHERE issue_id = ?1", params![id])?;
        tx.execute("DELETE FROM child_counters WHERE parent_id = ?1", params![id])?;
        tx.execute("DELETE FROM issues WHERE id = ?1", params![id])?;
        super::dirty::mark_dirty_tx(&tx, id)?;

        tx.commit()?;
        Ok(())
    }

    /// List issues matching the filter, ordered by priority then age.
    pub fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.query_issues(None, filter)
    }

    /// Search issues by substring over title and description.
    pub fn search_issues(&self, query: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.query_issues(Some(query), filter)
    }

    fn query_issues(&self, query: Option<&str>, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut sql = format!("SELECT {ISSUE_COLUMNS} FROM issues i");
        let mut conditions: Vec<String> = Vec::new();
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(q) = query {
            conditions.push(
                "(instr(lower(i.title), lower(?)) > 0 \
                 OR instr(lower(coalesce(i.description, '')), lower(?)) > 0)"
                    .to_string(),
            );
            args.push(Box::new(q.to_string()));
            args.push(Box::new(q.to_string()));
        }
        if let Some(s) = filter.status {
            conditions.push("i.status = ?".to_string());
            args.push(Box::new(s.as_str().to_string()));
        }
        if let Some(t) = filter.issue_type {
            conditions.push("i.issue_type = ?".to_string());
            args.push(Box::new(t.as_str().to_string()));
        }
        if let Some(p) = filter.priority_min {
            conditions.push("i.priority >= ?".to_string());
            args.push(Box::new(p as i64));
        }
        if let Some(p) = filter.priority_max {
            conditions.push("i.priority <= ?".to_string());
            args.push(Box::new(p as i64));
        }
        if let Some(a) = &filter.assignee {
            conditions.push("i.assignee = ?".to_string());
            args.push(Box::new(a.clone()));
        }
        if let Some(after) = filter.created_after {
            conditions.push("i.created_at >= ?".to_string());
            args.push(Box::new(after.to_rfc3339()));
        }
        if let Some(before) = filter.created_before {
            conditions.push("i.created_at <= ?".to_string());
            args.push(Box::new(before.to_rfc3339()));
        }
        for label in &filter.labels {
            conditions.push("i.id IN (SELECT issue_id FROM labels WHERE label = ?)".to_string());
            args.push(Box::new(label.clone()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY i.priority ASC, i.created_at ASC");

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Box::new(limit as i64));
        } else if filter.offset.is_some() {
            sql.push_str(" LIMIT -1");
        }
        if let Some(offset) = filter.offset {
            sql.push_str(" OFFSET ?");
            args.push(Box::new(offset as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let arg_refs: Vec<&dyn rusqlite::ToSql> = args.iter().map(|a| a.as_ref()).collect();
        let issues = stmt
            .query_map(arg_refs.as_slice(), row_to_issue)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    /// Get all issues, unfiltered.
    pub fn get_all_issues(&self) -> Result<Vec<Issue>> {
        self.list_issues(&IssueFilter::default())
    }

    /// Expand a user-typed prefix to a full issue ID.
    ///
    /// Exact IDs pass through. Otherwise matches IDs starting with the
    /// input, or with `{issue_prefix}-{input}` when the input omits the
    /// namespace. Fails with `AmbiguousId` on more than one match.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        if issue_exists_tx(&self.conn, input)? {
            return Ok(input.to_string());
        }

        let mut patterns = vec![format!("{input}%")];
        if !input.contains('-') {
            let prefix = super::config::get_config_tx(&self.conn, "issue_prefix")?
                .unwrap_or_else(|| "bd".to_string());
            patterns.push(format!("{prefix}-{input}%"));
        }

        let mut matches: Vec<String> = Vec::new();
        for pattern in &patterns {
            let mut stmt = self
                .conn
                .prepare("SELECT id FROM issues WHERE id LIKE ?1 ESCAPE '\\' ORDER BY id")?;
            let ids = stmt
                .query_map(params![pattern], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            for id in ids {
                if !matches.contains(&id) {
                    matches.push(id);
                }
            }
            if !matches.is_empty() {
                break;
            }
        }

        match matches.len() {
            0 => Err(Error::IssueNotFound(input.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::AmbiguousId {
                prefix: input.to_string(),
                matches,
            }),
        }
    }

    /// Rewrite an issue's primary key, cascading to every referring row.
    ///
    /// Inserts the updated issue under `new_id`, repoints dependencies,
    /// labels, comments, events, dirty entries, and child counters, then
    /// deletes the old row and logs an `id_changed` event. All or nothing.
    pub fn update_id(
        &mut self,
        old_id: &str,
        new_id: &str,
        updated: &Issue,
        actor: &str,
    ) -> Result<()> {
        let tx = self.write_tx()?;
        update_id_tx(&tx, old_id, new_id, updated, actor)?;
        tx.commit()?;
        Ok(())
    }

    /// Aggregate counters across the store.
    pub fn stats(&self) -> Result<Stats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(Stats {
            total: count("SELECT COUNT(*) FROM issues")?,
            open: count("SELECT COUNT(*) FROM issues WHERE status = 'open'")?,
            in_progress: count("SELECT COUNT(*) FROM issues WHERE status = 'in_progress'")?,
            blocked: count("SELECT COUNT(*) FROM issues WHERE status = 'blocked'")?,
            closed: count("SELECT COUNT(*) FROM issues WHERE status = 'closed'")?,
            dependencies: count("SELECT COUNT(*) FROM deps")?,
            labels: count("SELECT COUNT(*) FROM labels")?,
            comments: count("SELECT COUNT(*) FROM comments")?,
            dirty: count("SELECT COUNT(*) FROM dirty_issues")?,
        })
    }
}

/// The body of `update_id`, usable inside a larger transaction (the
/// hash-ID migration renames every issue in one transaction).
pub(crate) fn update_id_tx(
    conn: &Connection,
    old_id: &str,
    new_id: &str,
    updated: &Issue,
    actor: &str,
) -> Result<()> {
    if !issue_exists_tx(conn, old_id)? {
        return Err(Error::IssueNotFound(old_id.to_string()));
    }
    if issue_exists_tx(conn, new_id)? {
        return Err(Error::IdInUse(new_id.to_string()));
    }

    let mut moved = updated.clone();
    moved.id = new_id.to_string();
    insert_issue_row(conn, &moved)?;

    conn.execute(
        "UPDATE deps SET from_id = ?1 WHERE from_id = ?2",
        params![new_id, old_id],
    )?;
    conn.execute(
        "UPDATE deps SET to_id = ?1 WHERE to_id = ?2",
        params![new_id, old_id],
    )?;
    conn.execute(
        "UPDATE labels SET issue_id = ?1 WHERE issue_id = ?2",
        params![new_id, old_id],
    )?;
    conn.execute(
        "UPDATE comments SET issue_id = ?1 WHERE issue_id = ?2",
        params![new_id, old_id],
    )?;
    conn.execute(
        "UPDATE events SET issue_id = ?1 WHERE issue_id = ?2",
        params![new_id, old_id],
    )?;
    conn.execute(
        "DELETE FROM dirty_issues WHERE issue_id = ?1",
        params![old_id],
    )?;
    conn.execute(
        "UPDATE child_counters SET parent_id = ?1 WHERE parent_id = ?2",
        params![new_id, old_id],
    )?;
    conn.execute("DELETE FROM issues WHERE id = ?1", params![old_id])?;

    let event = Event::new(new_id.to_string(), EventKind::IdChanged, actor.to_string())
        .with_values(Some(old_id.to_string()), Some(new_id.to_string()));
    super::events::log_event_tx(conn, &event)?;
    super::dirty::mark_dirty_tx(conn, new_id)?;

    Ok(())
}

/// Existence check usable inside or outside a transaction.
pub(crate) fn issue_exists_tx(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM issues WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Write every mutable column of an issue back to its row.
pub(crate) fn write_issue_fields(conn: &Connection, issue: &Issue) -> Result<()> {
    let affected = conn.execute(
        "UPDATE issues SET title = ?1, description = ?2, design = ?3, notes = ?4,
         acceptance_criteria = ?5, status = ?6, priority = ?7, issue_type = ?8,
         assignee = ?9, external_ref = ?10, source_location = ?11, estimate = ?12,
         updated_at = ?13, closed_at = ?14
         WHERE id = ?15",
        params![
            issue.title,
            issue.description,
            issue.design,
            issue.notes,
            issue.acceptance_criteria,
            issue.status.as_str(),
            issue.priority as i64,
            issue.issue_type.as_str(),
            issue.assignee,
            issue.external_ref,
            issue.source_location,
            issue.estimate,
            issue.updated_at.to_rfc3339(),
            issue.closed_at.map(|t| t.to_rfc3339()),
            issue.id,
        ],
    )?;
    if affected == 0 {
        return Err(Error::IssueNotFound(issue.id.clone()));
    }
    Ok(())
}

/// Patch an optional text field: `Some("")` clears, `Some(v)` replaces.
fn apply_text_field(
    patch: &Option<String>,
    field: &mut Option<String>,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = patch {
        let next = if value.is_empty() {
            None
        } else {
            Some(value.clone())
        };
        if next != *field {
            *field = next;
            changed.push(name);
        }
    }
}

#[cfg(test)]
#[path = "issues_tests.rs"]
mod tests;
