// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for beads-core operations.
//!
//! Errors are classified by [`ErrorKind`], not by call site: the daemon
//! translates kinds into RPC error codes and the CLI maps them onto exit
//! codes without inspecting individual variants.

use thiserror::Error;

/// All possible errors that can occur in beads-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("ambiguous id prefix '{prefix}': matches {}", matches.join(", "))]
    AmbiguousId { prefix: String, matches: Vec<String> },

    #[error("id already in use: {0}")]
    IdInUse(String),

    #[error(
        "would create a dependency cycle\n  hint: this would create a circular {0} chain"
    )]
    CycleDetected(String),

    #[error("cannot create self-dependency\n  hint: an issue cannot block or parent itself")]
    SelfDependency,

    #[error("issue {0} already has a parent\n  hint: remove the existing parent-child link first")]
    ParentExists(String),

    #[error("dependency not found: {from} {dep_type} {to}")]
    DependencyNotFound {
        from: String,
        dep_type: String,
        to: String,
    },

    #[error("import collision on {0}\n  hint: re-run with --resolve-collisions to remap")]
    ImportCollision(String),

    #[error("dangling dependency target: {from} -> {to}")]
    DanglingReference { from: String, to: String },

    #[error("malformed journal line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("invalid issue type: '{0}'\n  hint: valid types are: bug, feature, task, epic, chore")]
    InvalidIssueType(String),

    #[error(
        "invalid status: '{0}'\n  hint: valid statuses are: open, in_progress, blocked, closed"
    )]
    InvalidStatus(String),

    #[error("invalid dependency type: '{0}'\n  hint: valid types are: blocks, related, parent-child, discovered-from")]
    InvalidDepType(String),

    #[error("invalid priority: '{0}'\n  hint: priority is 0 (highest) through 4 (lowest)")]
    InvalidPriority(String),

    #[error("invalid event kind: '{0}'")]
    InvalidEventKind(String),

    #[error("invalid prefix: must be 2+ lowercase alphanumeric with at least one letter")]
    InvalidPrefix,

    #[error("{0}")]
    InvalidInput(String),

    #[error("store is busy: {0}\n  hint: another writer holds the database lock; retry")]
    Locked(String),

    #[error("corrupted data: {0}")]
    Corrupt(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used for RPC error codes and CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Ambiguous,
    Conflict,
    IdInUse,
    Locked,
    Malformed,
    Corrupt,
    Cancelled,
    InvalidInput,
    Internal,
}

impl Error {
    /// Classify this error for propagation across the RPC and CLI boundaries.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IssueNotFound(_) | Error::DependencyNotFound { .. } => ErrorKind::NotFound,
            Error::AmbiguousId { .. } => ErrorKind::Ambiguous,
            Error::CycleDetected(_)
            | Error::SelfDependency
            | Error::ParentExists(_)
            | Error::ImportCollision(_)
            | Error::DanglingReference { .. } => ErrorKind::Conflict,
            Error::IdInUse(_) => ErrorKind::IdInUse,
            Error::Locked(_) => ErrorKind::Locked,
            Error::Malformed { .. } => ErrorKind::Malformed,
            Error::Corrupt(_) => ErrorKind::Corrupt,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::InvalidIssueType(_)
            | Error::InvalidStatus(_)
            | Error::InvalidDepType(_)
            | Error::InvalidPriority(_)
            | Error::InvalidEventKind(_)
            | Error::InvalidPrefix
            | Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Database(_) | Error::Io(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }

    /// Whether a retry with backoff may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Locked
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        let classified = match &e {
            rusqlite::Error::SqliteFailure(err, msg) => Some((err.code, msg.clone())),
            _ => None,
        };

        match classified {
            Some((ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked, msg)) => {
                Error::Locked(msg.unwrap_or_else(|| "database is locked".into()))
            }
            Some((ErrorCode::ConstraintViolation, msg)) => {
                Error::InvalidInput(msg.unwrap_or_else(|| "constraint violation".into()))
            }
            Some((ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase, msg)) => {
                Error::Corrupt(msg.unwrap_or_else(|| "database corrupt".into()))
            }
            _ => Error::Database(e),
        }
    }
}

/// A specialized Result type for beads-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
