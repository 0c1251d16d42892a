// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI error type and exit-code mapping.
//!
//! Exit codes: 0 success, 1 user error, 2 not found or ambiguous,
//! 3 conflict, 4 internal.

use thiserror::Error as ThisError;

use beads_core::ErrorKind;
use beads_ipc::ErrorCode;

/// All possible errors surfaced by the bd CLI.
#[derive(Debug, ThisError)]
pub enum Error {
    /// An error from the local store or core subsystems.
    #[error("{0}")]
    Core(#[from] beads_core::Error),

    /// An error relayed by the daemon.
    #[error("{message}")]
    Rpc { code: ErrorCode, message: String },

    /// Daemon lifecycle problems (spawn, handshake).
    #[error("daemon: {0}")]
    Daemon(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad command-line input not caught by clap.
    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Core(e) => kind_exit_code(e.kind()),
            Error::Rpc { code, .. } => code_exit_code(*code),
            Error::Usage(_) => 1,
            Error::Daemon(_) | Error::Io(_) | Error::Json(_) => 4,
        }
    }
}

fn kind_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::Malformed => 1,
        ErrorKind::NotFound | ErrorKind::Ambiguous => 2,
        ErrorKind::Conflict | ErrorKind::IdInUse => 3,
        ErrorKind::Locked | ErrorKind::Corrupt | ErrorKind::Cancelled | ErrorKind::Internal => 4,
    }
}

fn code_exit_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidInput | ErrorCode::Malformed => 1,
        ErrorCode::NotFound | ErrorCode::Ambiguous => 2,
        ErrorCode::Conflict | ErrorCode::IdInUse => 3,
        ErrorCode::Locked | ErrorCode::Corrupt | ErrorCode::Cancelled | ErrorCode::Internal => 4,
    }
}

/// A specialized Result type for bd CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
