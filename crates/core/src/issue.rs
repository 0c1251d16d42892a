// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core issue types for the bd issue tracker.
//!
//! This module contains the fundamental data types: Issue, IssueType,
//! Status, DepType, Dependency, Comment, Event, and EventKind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Classification of issues by their nature and scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Defect or problem to fix.
    Bug,
    /// New capability.
    Feature,
    /// Standard unit of work.
    #[default]
    Task,
    /// Large initiative whose children are hierarchical issues.
    Epic,
    /// Maintenance work (refactoring, cleanup, dependency updates).
    Chore,
}

impl IssueType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
            IssueType::Task => "task",
            IssueType::Epic => "epic",
            IssueType::Chore => "chore",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bug" => Ok(IssueType::Bug),
            "feature" => Ok(IssueType::Feature),
            "task" => Ok(IssueType::Task),
            "epic" => Ok(IssueType::Epic),
            "chore" => Ok(IssueType::Chore),
            _ => Err(Error::InvalidIssueType(s.to_string())),
        }
    }
}

/// Workflow status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not yet started. Initial state for new issues.
    Open,
    /// Currently being worked on.
    InProgress,
    /// Explicitly parked; excluded from the ready frontier.
    Blocked,
    /// Finished or abandoned; the only terminal state.
    Closed,
}

impl Status {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Blocked => "blocked",
            Status::Closed => "closed",
        }
    }

    /// Returns true if work on the issue is finished.
    pub fn is_closed(&self) -> bool {
        matches!(self, Status::Closed)
    }

    /// Returns true if the status is eligible for the ready frontier.
    pub fn is_workable(&self) -> bool {
        matches!(self, Status::Open | Status::InProgress)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Status::Open),
            "in_progress" => Ok(Status::InProgress),
            "blocked" => Ok(Status::Blocked),
            "closed" => Ok(Status::Closed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Parse a priority value (numeric 0-4 or named).
pub fn parse_priority(value: &str) -> Result<u8> {
    match value {
        "0" | "highest" | "critical" => Ok(0),
        "1" | "high" => Ok(1),
        "2" | "medium" | "med" => Ok(2),
        "3" | "low" => Ok(3),
        "4" | "lowest" => Ok(4),
        _ => Err(Error::InvalidPriority(value.to_string())),
    }
}

/// The primary entity representing a tracked work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier (`{prefix}-{hash}` with optional `.N` suffixes).
    pub id: String,
    /// Short description of the work.
    pub title: String,
    /// Longer description providing context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Proposed approach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    /// Freeform working notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Conditions for calling the work done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    /// Current workflow state.
    pub status: Status,
    /// 0 (highest) through 4 (lowest).
    pub priority: u8,
    /// Classification of the issue.
    pub issue_type: IssueType,
    /// Person or queue this issue is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Reference into an external tracker (e.g. `gh-1234`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    /// File/line the issue was discovered at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    /// Rough size estimate in arbitrary units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<i64>,
    /// When the issue was created.
    pub created_at: DateTime<Utc>,
    /// When the issue was last modified.
    pub updated_at: DateTime<Utc>,
    /// Set exactly when status is closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Creates a new open issue with the given identity fields.
    pub fn new(id: String, issue_type: IssueType, title: String, created_at: DateTime<Utc>) -> Self {
        Issue {
            id,
            title,
            description: None,
            design: None,
            notes: None,
            acceptance_criteria: None,
            status: Status::Open,
            priority: 2,
            issue_type,
            assignee: None,
            external_ref: None,
            source_location: None,
            estimate: None,
            created_at,
            updated_at: created_at,
            closed_at: None,
        }
    }
}

/// Relation types for dependencies between issues.
///
/// `blocks` and `parent-child` are kept acyclic by the store; `related`
/// and `discovered-from` are non-blocking and may form cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepType {
    /// `A blocks B`: B cannot be ready while A is not closed.
    Blocks,
    /// Informational association; never affects readiness.
    Related,
    /// Edge from a hierarchical child to its parent epic.
    ParentChild,
    /// The source issue was found while working on the target.
    DiscoveredFrom,
}

impl DepType {
    /// Returns the string representation used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            DepType::Blocks => "blocks",
            DepType::Related => "related",
            DepType::ParentChild => "parent-child",
            DepType::DiscoveredFrom => "discovered-from",
        }
    }

    /// Returns true for the edge types that must stay acyclic.
    pub fn is_acyclic(&self) -> bool {
        matches!(self, DepType::Blocks | DepType::ParentChild)
    }
}

impl fmt::Display for DepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DepType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "blocks" => Ok(DepType::Blocks),
            "related" => Ok(DepType::Related),
            "parent-child" | "parent_child" => Ok(DepType::ParentChild),
            "discovered-from" | "discovered_from" => Ok(DepType::DiscoveredFrom),
            _ => Err(Error::InvalidDepType(s.to_string())),
        }
    }
}

/// A dependency relationship between two issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// The source issue ID.
    pub from_id: String,
    /// The target issue ID.
    pub to_id: String,
    /// The type of relationship.
    pub dep_type: DepType,
    /// When the dependency was created.
    pub created_at: DateTime<Utc>,
}

/// An immutable comment attached to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Database-assigned identifier.
    pub id: i64,
    /// The issue this comment belongs to.
    pub issue_id: String,
    /// Who wrote the comment.
    pub author: String,
    /// The comment content.
    pub text: String,
    /// When the comment was written.
    pub created_at: DateTime<Utc>,
}

/// Types of actions recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    Updated,
    StatusChanged,
    Closed,
    Reopened,
    IdChanged,
    DependencyAdded,
    DependencyRemoved,
    LabelAdded,
    LabelRemoved,
    Commented,
    Deleted,
}

impl EventKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::StatusChanged => "status_changed",
            EventKind::Closed => "closed",
            EventKind::Reopened => "reopened",
            EventKind::IdChanged => "id_changed",
            EventKind::DependencyAdded => "dependency_added",
            EventKind::DependencyRemoved => "dependency_removed",
            EventKind::LabelAdded => "label_added",
            EventKind::LabelRemoved => "label_removed",
            EventKind::Commented => "commented",
            EventKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "created" => Ok(EventKind::Created),
            "updated" => Ok(EventKind::Updated),
            "status_changed" => Ok(EventKind::StatusChanged),
            "closed" => Ok(EventKind::Closed),
            "reopened" => Ok(EventKind::Reopened),
            "id_changed" => Ok(EventKind::IdChanged),
            "dependency_added" => Ok(EventKind::DependencyAdded),
            "dependency_removed" => Ok(EventKind::DependencyRemoved),
            "label_added" => Ok(EventKind::LabelAdded),
            "label_removed" => Ok(EventKind::LabelRemoved),
            "commented" => Ok(EventKind::Commented),
            "deleted" => Ok(EventKind::Deleted),
            _ => Err(Error::InvalidEventKind(s.to_string())),
        }
    }
}

/// An audit log entry recording a change to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Database-assigned identifier.
    pub id: i64,
    /// The issue this event belongs to.
    pub issue_id: String,
    /// What type of change occurred.
    pub kind: EventKind,
    /// Who performed the change.
    pub actor: String,
    /// Previous value (for edits, status changes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// New value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Creates a new event with the current timestamp.
    pub fn new(issue_id: String, kind: EventKind, actor: String) -> Self {
        Event {
            id: 0, // assigned by the database
            issue_id,
            kind,
            actor,
            before: None,
            after: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the before and after values for this event (builder pattern).
    pub fn with_values(mut self, before: Option<String>, after: Option<String>) -> Self {
        self.before = before;
        self.after = after;
        self
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
