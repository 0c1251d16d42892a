// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The JSONL journal codec.
//!
//! The journal is a line-delimited text file mirroring the store: one
//! self-contained record per line, each an issue with its labels, outgoing
//! dependencies, and comments embedded. Records are emitted sorted by
//! issue ID and nested collections under documented sort keys, so two
//! identical databases produce byte-identical journals. Unknown fields
//! survive a decode/encode round trip.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{IssueFilter, Store};
use crate::error::{Error, Result};
use crate::issue::{Comment, DepType, Dependency, Issue, IssueType, Status};

/// A dependency embedded in a journal record (from the record's issue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalDep {
    pub to_id: String,
    pub dep_type: DepType,
    pub created_at: DateTime<Utc>,
}

/// A comment embedded in a journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalComment {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One journal line: an issue with embedded relations.
///
/// Fields this codec does not know are captured in `extra` and re-emitted
/// on encode (forward compatibility with newer writers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    pub status: Status,
    pub priority: u8,
    pub issue_type: IssueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<JournalDep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<JournalComment>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl JournalRecord {
    /// Assemble a record from an issue and its relations, applying the
    /// deterministic nested ordering.
    pub fn assemble(
        issue: &Issue,
        labels: Vec<String>,
        deps: Vec<Dependency>,
        comments: Vec<Comment>,
    ) -> Self {
        let mut labels = labels;
        labels.sort();
        labels.dedup();

        let mut dependencies: Vec<JournalDep> = deps
            .into_iter()
            .map(|d| JournalDep {
                to_id: d.to_id,
                dep_type: d.dep_type,
                created_at: d.created_at,
            })
            .collect();
        dependencies.sort_by(|a, b| (&a.to_id, a.dep_type).cmp(&(&b.to_id, b.dep_type)));

        let mut comments: Vec<JournalComment> = comments
            .into_iter()
            .map(|c| JournalComment {
                author: c.author,
                text: c.text,
                created_at: c.created_at,
            })
            .collect();
        comments.sort_by(|a, b| {
            (a.created_at, &a.author, &a.text).cmp(&(b.created_at, &b.author, &b.text))
        });

        JournalRecord {
            id: issue.id.clone(),
            title: issue.title.clone(),
            description: issue.description.clone(),
            design: issue.design.clone(),
            notes: issue.notes.clone(),
            acceptance_criteria: issue.acceptance_criteria.clone(),
            status: issue.status,
            priority: issue.priority,
            issue_type: issue.issue_type,
            assignee: issue.assignee.clone(),
            external_ref: issue.external_ref.clone(),
            source_location: issue.source_location.clone(),
            estimate: issue.estimate,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            closed_at: issue.closed_at,
            labels,
            dependencies,
            comments,
            extra: BTreeMap::new(),
        }
    }

    /// The issue carried by this record (relations stripped).
    pub fn to_issue(&self) -> Issue {
        Issue {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            design: self.design.clone(),
            notes: self.notes.clone(),
            acceptance_criteria: self.acceptance_criteria.clone(),
            status: self.status,
            priority: self.priority,
            issue_type: self.issue_type,
            assignee: self.assignee.clone(),
            external_ref: self.external_ref.clone(),
            source_location: self.source_location.clone(),
            estimate: self.estimate,
            created_at: self.created_at,
            updated_at: self.updated_at,
            closed_at: self.closed_at,
        }
    }
}

/// Capture the store's full state as journal records, sorted by issue ID.
pub fn snapshot(store: &Store) -> Result<Vec<JournalRecord>> {
    let mut issues = store.list_issues(&IssueFilter::default())?;
    issues.sort_by(|a, b| a.id.cmp(&b.id));

    let mut records = Vec::with_capacity(issues.len());
    for issue in &issues {
        let labels = store.get_labels(&issue.id)?;
        let deps = store.get_deps_from(&issue.id)?;
        let comments = store.get_comments(&issue.id)?;
        records.push(JournalRecord::assemble(issue, labels, deps, comments));
    }

    Ok(records)
}

/// Encode records as JSONL. The output always ends with a newline.
pub fn encode(records: &[JournalRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Decode a journal, line by line.
///
/// A malformed line fails the whole decode with a 1-based line number and
/// the parser's position diagnostic; blank lines are skipped.
pub fn decode(text: &str) -> Result<Vec<JournalRecord>> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: JournalRecord =
            serde_json::from_str(line).map_err(|e| Error::Malformed {
                line: idx + 1,
                reason: e.to_string(),
            })?;
        records.push(record);
    }
    Ok(records)
}

/// Read and decode a journal file. A missing file is an empty journal.
pub fn read_file(path: &Path) -> Result<Vec<JournalRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    decode(&text)
}

/// Write the journal atomically: temp file in the same directory, fsync,
/// rename over the target.
pub fn write_atomic(path: &Path, records: &[JournalRecord]) -> Result<()> {
    let content = encode(records)?;
    let tmp_path = path.with_extension("jsonl.tmp");

    let mut file = File::create(&tmp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Export the store's current state to the journal file.
pub fn export(store: &Store, path: &Path) -> Result<()> {
    let records = snapshot(store)?;
    write_atomic(path, &records)
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
