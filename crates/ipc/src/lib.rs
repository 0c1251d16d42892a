// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared RPC protocol for CLI-daemon communication.
//!
//! The daemon listens on a Unix socket and accepts commands from `bd`
//! processes. Messages are serialized as JSON with length-prefixed
//! framing: 4 bytes big-endian length, then the payload. One request is
//! in flight per connection.

use serde::{Deserialize, Serialize};

use beads_core::import::ImportReport;
use beads_core::planner::{BlockedInfo, TreeNode};
use beads_core::{
    Comment, DepType, Event, Issue, IssueFilter, IssueType, NewIssue, Stats, Status, UpdatePatch,
};

/// Request sent from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Create {
        new: NewIssueWire,
        actor: String,
    },
    Get {
        id: String,
    },
    Update {
        id: String,
        patch: UpdatePatchWire,
        actor: String,
    },
    Close {
        id: String,
        actor: String,
        reason: Option<String>,
    },
    Reopen {
        id: String,
        actor: String,
    },
    Delete {
        id: String,
    },
    List {
        filter: FilterWire,
    },
    Search {
        query: String,
        filter: FilterWire,
    },
    ReadyWork {
        filter: FilterWire,
    },
    BlockedWork {
        filter: FilterWire,
    },
    DependencyTree {
        id: String,
        max_depth: usize,
    },
    AddDependency {
        from_id: String,
        to_id: String,
        dep_type: DepType,
        actor: String,
    },
    RemoveDependency {
        from_id: String,
        to_id: String,
        dep_type: DepType,
        actor: String,
    },
    AddLabel {
        id: String,
        label: String,
        actor: String,
    },
    RemoveLabel {
        id: String,
        label: String,
        actor: String,
    },
    AddComment {
        id: String,
        author: String,
        text: String,
    },
    GetComments {
        id: String,
    },
    GetEvents {
        id: String,
    },
    GetLabels {
        id: String,
    },
    Import {
        journal: String,
        resolve_collisions: bool,
        strict: bool,
        dry_run: bool,
        actor: String,
    },
    Export,
    ResolveId {
        input: String,
    },
    Stats,
    Flush,
    /// Liveness probe.
    Ping,
    /// Graceful shutdown.
    Shutdown,
    /// Version handshake request.
    Hello {
        version: String,
    },
}

/// Response sent from daemon to CLI.
///
/// Adjacently tagged: payloads include sequences and plain strings, which
/// an internal tag cannot carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Response {
    Issue(Box<Issue>),
    Issues(Vec<Issue>),
    Blocked(Vec<BlockedInfo>),
    Tree(Box<TreeNode>),
    Comments(Vec<Comment>),
    Events(Vec<Event>),
    Labels(Vec<String>),
    ImportReport(Box<ImportReport>),
    /// Full journal text for Export.
    Journal(String),
    ResolvedId(String),
    Stats(Stats),
    /// Generic success for mutations with nothing to return.
    Ok,
    Pong,
    ShuttingDown,
    Hello {
        version: String,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

/// RPC error codes, mirroring `beads_core::ErrorKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
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

impl From<beads_core::ErrorKind> for ErrorCode {
    fn from(kind: beads_core::ErrorKind) -> Self {
        use beads_core::ErrorKind as K;
        match kind {
            K::NotFound => ErrorCode::NotFound,
            K::Ambiguous => ErrorCode::Ambiguous,
            K::Conflict => ErrorCode::Conflict,
            K::IdInUse => ErrorCode::IdInUse,
            K::Locked => ErrorCode::Locked,
            K::Malformed => ErrorCode::Malformed,
            K::Corrupt => ErrorCode::Corrupt,
            K::Cancelled => ErrorCode::Cancelled,
            K::InvalidInput => ErrorCode::InvalidInput,
            K::Internal => ErrorCode::Internal,
        }
    }
}

impl Response {
    /// Build an error response from a core error.
    pub fn from_error(e: &beads_core::Error) -> Self {
        Response::Error {
            code: e.kind().into(),
            message: e.to_string(),
        }
    }
}

/// Wire form of `NewIssue` (serde-friendly, all fields optional except
/// the title).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIssueWire {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl From<NewIssueWire> for NewIssue {
    fn from(w: NewIssueWire) -> Self {
        let defaults = NewIssue::default();
        NewIssue {
            title: w.title,
            description: w.description,
            design: w.design,
            notes: w.notes,
            acceptance_criteria: w.acceptance_criteria,
            priority: w.priority.unwrap_or(defaults.priority),
            issue_type: w.issue_type.unwrap_or(defaults.issue_type),
            assignee: w.assignee,
            external_ref: w.external_ref,
            source_location: w.source_location,
            estimate: w.estimate,
            parent: w.parent,
        }
    }
}

impl From<NewIssue> for NewIssueWire {
    fn from(n: NewIssue) -> Self {
        NewIssueWire {
            title: n.title,
            description: n.description,
            design: n.design,
            notes: n.notes,
            acceptance_criteria: n.acceptance_criteria,
            priority: Some(n.priority),
            issue_type: Some(n.issue_type),
            assignee: n.assignee,
            external_ref: n.external_ref,
            source_location: n.source_location,
            estimate: n.estimate,
            parent: n.parent,
        }
    }
}

/// Wire form of `UpdatePatch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatchWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<i64>,
}

impl From<UpdatePatchWire> for UpdatePatch {
    fn from(w: UpdatePatchWire) -> Self {
        UpdatePatch {
            title: w.title,
            description: w.description,
            design: w.design,
            notes: w.notes,
            acceptance_criteria: w.acceptance_criteria,
            status: w.status,
            priority: w.priority,
            issue_type: w.issue_type,
            assignee: w.assignee,
            external_ref: w.external_ref,
            source_location: w.source_location,
            estimate: w.estimate,
        }
    }
}

impl From<UpdatePatch> for UpdatePatchWire {
    fn from(p: UpdatePatch) -> Self {
        UpdatePatchWire {
            title: p.title,
            description: p.description,
            design: p.design,
            notes: p.notes,
            acceptance_criteria: p.acceptance_criteria,
            status: p.status,
            priority: p.priority,
            issue_type: p.issue_type,
            assignee: p.assignee,
            external_ref: p.external_ref,
            source_location: p.source_location,
            estimate: p.estimate,
        }
    }
}

/// Wire form of `IssueFilter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_min: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_max: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl From<FilterWire> for IssueFilter {
    fn from(w: FilterWire) -> Self {
        IssueFilter {
            status: w.status,
            issue_type: w.issue_type,
            priority_min: w.priority_min,
            priority_max: w.priority_max,
            labels: w.labels,
            assignee: w.assignee,
            created_after: w.created_after,
            created_before: w.created_before,
            offset: w.offset,
            limit: w.limit,
        }
    }
}

impl From<IssueFilter> for FilterWire {
    fn from(f: IssueFilter) -> Self {
        FilterWire {
            status: f.status,
            issue_type: f.issue_type,
            priority_min: f.priority_min,
            priority_max: f.priority_max,
            labels: f.labels,
            assignee: f.assignee,
            created_after: f.created_after,
            created_before: f.created_before,
            offset: f.offset,
            limit: f.limit,
        }
    }
}

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use super::*;

    /// Maximum message size (16MB): journals travel whole over Import/Export.
    pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

    fn write_frame<W: Write>(writer: &mut W, json: &[u8]) -> std::io::Result<()> {
        let len = u32::try_from(json.len())
            .map_err(|_| std::io::Error::other("message too large".to_string()))?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(json)?;
        writer.flush()?;
        Ok(())
    }

    fn read_frame<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {len} bytes (max {MAX_MESSAGE_SIZE})"
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Write a request to the given writer (client side).
    pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> std::io::Result<()> {
        let json = serde_json::to_vec(request)
            .map_err(|e| std::io::Error::other(format!("serialize error: {e}")))?;
        write_frame(writer, &json)
    }

    /// Read a response from the given reader (client side).
    pub fn read_response<R: Read>(reader: &mut R) -> std::io::Result<Response> {
        let buf = read_frame(reader)?;
        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {e}")))
    }

    /// Read a request from the given reader (server side, used by tests).
    pub fn read_request<R: Read>(reader: &mut R) -> std::io::Result<Request> {
        let buf = read_frame(reader)?;
        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {e}")))
    }

    /// Write a response to the given writer (server side, used by tests).
    pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> std::io::Result<()> {
        let json = serde_json::to_vec(response)
            .map_err(|e| std::io::Error::other(format!("serialize error: {e}")))?;
        write_frame(writer, &json)
    }
}

/// Async IPC message framing using tokio (daemon side).
pub mod framing_async {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::framing::MAX_MESSAGE_SIZE;
    use super::*;

    /// Read a request from the given async reader.
    pub async fn read_request<R: AsyncReadExt + Unpin>(
        reader: &mut R,
    ) -> std::io::Result<Request> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {len} bytes (max {MAX_MESSAGE_SIZE})"
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;

        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {e}")))
    }

    /// Write a response to the given async writer.
    pub async fn write_response<W: AsyncWriteExt + Unpin>(
        writer: &mut W,
        response: &Response,
    ) -> std::io::Result<()> {
        let json = serde_json::to_vec(response)
            .map_err(|e| std::io::Error::other(format!("serialize error: {e}")))?;
        let len = u32::try_from(json.len())
            .map_err(|_| std::io::Error::other("message too large".to_string()))?;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&json).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
