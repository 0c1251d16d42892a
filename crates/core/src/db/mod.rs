// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed store for the issue graph.
//!
//! The [`Store`] struct provides all data access operations for issues,
//! dependencies, labels, comments, events, config, child counters, and the
//! dirty set. Submodules group the operations by table; every multi-row
//! mutation runs inside a transaction.

pub(crate) mod comments;
pub(crate) mod config;
pub(crate) mod counters;
pub(crate) mod deps;
pub(crate) mod dirty;
pub(crate) mod events;
pub(crate) mod issues;
pub(crate) mod labels;

pub use issues::{IssueFilter, NewIssue, Stats, UpdatePatch};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// SQL schema for the issue tracker database.
pub const SCHEMA: &str = r#"
-- Core issue table
CREATE TABLE IF NOT EXISTS issues (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    design TEXT,
    notes TEXT,
    acceptance_criteria TEXT,
    status TEXT NOT NULL DEFAULT 'open',
    priority INTEGER NOT NULL DEFAULT 2,
    issue_type TEXT NOT NULL,
    assignee TEXT,
    external_ref TEXT,
    source_location TEXT,
    estimate INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    closed_at TEXT,
    CHECK (priority BETWEEN 0 AND 4)
);

-- Dependencies with relationship types
CREATE TABLE IF NOT EXISTS deps (
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    dep_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (from_id, to_id, dep_type),
    CHECK (from_id != to_id)
);

-- Labels as raw strings
CREATE TABLE IF NOT EXISTS labels (
    issue_id TEXT NOT NULL,
    label TEXT NOT NULL,
    PRIMARY KEY (issue_id, label)
);

-- Append-only comment log
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id TEXT NOT NULL,
    author TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Event log (audit trail)
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    actor TEXT NOT NULL,
    before_value TEXT,
    after_value TEXT,
    created_at TEXT NOT NULL
);

-- Key-value configuration
CREATE TABLE IF NOT EXISTS config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Per-parent monotonic child counters
CREATE TABLE IF NOT EXISTS child_counters (
    parent_id TEXT PRIMARY KEY,
    counter INTEGER NOT NULL DEFAULT 0
);

-- Issues whose state has not yet been written to the journal
CREATE TABLE IF NOT EXISTS dirty_issues (
    issue_id TEXT PRIMARY KEY,
    marked_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
CREATE INDEX IF NOT EXISTS idx_issues_priority_created ON issues(priority, created_at);
CREATE INDEX IF NOT EXISTS idx_issues_type ON issues(issue_type);
CREATE INDEX IF NOT EXISTS idx_deps_from ON deps(from_id);
CREATE INDEX IF NOT EXISTS idx_deps_to ON deps(to_id);
CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id);
CREATE INDEX IF NOT EXISTS idx_events_issue ON events(issue_id);
"#;

/// Parse a string value from the database, returning a rusqlite error on
/// parse failure so it surfaces through `query_map` unchanged.
pub(crate) fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::Corrupt(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
pub(crate) fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::Corrupt(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse an optional RFC3339 timestamp from the database.
pub(crate) fn parse_timestamp_opt(
    value: Option<String>,
    column: &str,
) -> std::result::Result<Option<DateTime<Utc>>, rusqlite::Error> {
    match value {
        None => Ok(None),
        Some(s) => parse_timestamp(&s, column).map(Some),
    }
}

/// Run schema creation and all migrations on a database connection.
///
/// This is the single migration path for all crates (core, daemon, CLI).
/// Migrations are forward-only and additive; they upgrade older databases
/// that may be missing columns.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_add_issue_columns(conn)?;
    Ok(())
}

/// Migration: add columns introduced after the first release.
fn migrate_add_issue_columns(conn: &Connection) -> Result<()> {
    let columns = [
        ("assignee", "TEXT"),
        ("external_ref", "TEXT"),
        ("source_location", "TEXT"),
        ("estimate", "INTEGER"),
    ];

    for (column, sql_type) in columns {
        let has_column: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('issues') WHERE name = ?1",
                [column],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !has_column {
            let sql = format!("ALTER TABLE issues ADD COLUMN {column} {sql_type}");
            conn.execute(&sql, [])?;
        }
    }
    Ok(())
}

/// SQLite store with issue tracker operations.
pub struct Store {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Store {
    /// Open a store at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL for concurrent readers, busy_timeout to ride out writer locks
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let store = Store { conn };
        run_migrations(&store.conn)?;
        store.integrity_check()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Store { conn };
        run_migrations(&store.conn)?;
        Ok(store)
    }

    /// Quick integrity probe; a failure here is fatal (`Corrupt`).
    fn integrity_check(&self) -> Result<()> {
        let ok: String = self
            .conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))?;
        if ok != "ok" {
            return Err(Error::Corrupt(format!("integrity check failed: {ok}")));
        }
        Ok(())
    }

    /// Begin an immediate write transaction.
    ///
    /// Immediate mode takes the write lock up front so concurrent writers
    /// queue on busy_timeout instead of deadlocking on lock upgrade.
    pub(crate) fn write_tx(&mut self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

/// Maximum attempts for retrying a `Locked` operation.
const LOCKED_RETRIES: u32 = 5;

/// Run an operation, retrying with bounded exponential backoff while it
/// fails with `Locked`. All other errors propagate immediately.
pub fn retry_locked<T>(mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut delay = Duration::from_millis(10);
    let mut attempt = 0;
    loop {
        match op() {
            Err(e) if e.is_retryable() && attempt < LOCKED_RETRIES => {
                attempt += 1;
                std::thread::sleep(delay);
                delay = delay.saturating_mul(2);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
