// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The import pipeline: reconcile an incoming journal against the store.
//!
//! Every incoming record is classified as new (no local issue with that
//! ID), idempotent (local issue matches field for field), or colliding
//! (same ID, different content). Classification runs as a dry-run pass
//! producing a report; the apply pass runs in one transaction, so partial
//! application is impossible. With `resolve_collisions` set, colliding
//! records get fresh hash IDs and every reference to the old ID inside
//! the batch is rewritten.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::Store;
use crate::error::{Error, Result};
use crate::id;
use crate::issue::{Event, EventKind};
use crate::journal::JournalRecord;

/// Flags controlling import behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Remap colliding records to fresh hash IDs instead of aborting.
    pub resolve_collisions: bool,
    /// Treat dangling dependency targets as fatal.
    pub strict: bool,
}

/// A single field difference between a local issue and an incoming record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub local: String,
    pub incoming: String,
}

/// A colliding record: same ID, different content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collision {
    pub id: String,
    pub diffs: Vec<FieldDiff>,
}

/// Outcome of a dry-run or apply pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// IDs inserted (post-remap IDs for resolved collisions).
    pub new_ids: Vec<String>,
    /// Records that matched the local store exactly and were skipped.
    pub idempotent: usize,
    pub collisions: Vec<Collision>,
    /// Dependency edges whose target exists in neither the batch nor the
    /// store, as (from, to) pairs.
    pub dangling: Vec<(String, String)>,
    /// Old ID -> fresh ID assignments made by collision resolution.
    pub remapped: BTreeMap<String, String>,
    /// False for a dry run.
    pub applied: bool,
}

impl ImportReport {
    pub fn new_count(&self) -> usize {
        self.new_ids.len()
    }
}

/// Classify the batch against the store without mutating anything.
pub fn dry_run(
    store: &Store,
    records: &[JournalRecord],
    _opts: &ImportOptions,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let batch_ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

    for record in records {
        if store.issue_exists(&record.id)? {
            let diffs = diff_record(store, record)?;
            if diffs.is_empty() {
                report.idempotent += 1;
            } else {
                report.collisions.push(Collision {
                    id: record.id.clone(),
                    diffs,
                });
            }
        } else {
            report.new_ids.push(record.id.clone());
        }

        for dep in &record.dependencies {
            if !batch_ids.contains(dep.to_id.as_str()) && !store.issue_exists(&dep.to_id)? {
                report.dangling.push((record.id.clone(), dep.to_id.clone()));
            }
        }
    }

    Ok(report)
}

/// Apply the batch in one transaction.
///
/// Collisions abort unless `resolve_collisions` is set; dangling targets
/// abort only in strict mode. The local copy of a colliding ID is never
/// touched: the incoming record is inserted under a fresh ID.
pub fn apply(
    store: &mut Store,
    records: &[JournalRecord],
    opts: &ImportOptions,
    actor: &str,
) -> Result<ImportReport> {
    let mut report = dry_run(store, records, opts)?;

    if !report.collisions.is_empty() && !opts.resolve_collisions {
        return Err(Error::ImportCollision(report.collisions[0].id.clone()));
    }
    if opts.strict {
        if let Some((from, to)) = report.dangling.first() {
            return Err(Error::DanglingReference {
                from: from.clone(),
                to: to.clone(),
            });
        }
    }

    let colliding: HashSet<String> = report.collisions.iter().map(|c| c.id.clone()).collect();
    let skip_dangling: HashSet<(String, String)> = report.dangling.iter().cloned().collect();

    let tx = store.write_tx()?;

    // Assign fresh IDs for colliding records before touching any rows, so
    // intra-batch references can be rewritten in one pass.
    let mut mapping: BTreeMap<String, String> = BTreeMap::new();
    for record in records {
        if colliding.contains(&record.id) {
            let fresh = id::allocate_hash_id(
                &tx,
                &record.title,
                record.description.as_deref(),
                actor,
                record.created_at,
            )?;
            mapping.insert(record.id.clone(), fresh);
        }
    }

    report.new_ids.clear();

    for original in records {
        let was_colliding = colliding.contains(&original.id);
        let is_new = !crate::db::issues::issue_exists_tx(&tx, &original.id)?;
        if !was_colliding && !is_new {
            continue; // idempotent
        }

        let record = rewrite_record(original, &mapping);
        let mut issue = record.to_issue();

        // Normalise the closed_at invariant on ingest
        if issue.status.is_closed() {
            issue.closed_at = issue.closed_at.or(Some(issue.updated_at));
        } else {
            issue.closed_at = None;
        }

        crate::db::issues::insert_issue_row(&tx, &issue)?;

        for label in &record.labels {
            tx.execute(
                "INSERT OR IGNORE INTO labels (issue_id, label) VALUES (?1, ?2)",
                rusqlite::params![issue.id, label],
            )?;
        }
        for comment in &record.comments {
            tx.execute(
                "INSERT INTO comments (issue_id, author, text, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    issue.id,
                    comment.author,
                    comment.text,
                    comment.created_at.to_rfc3339()
                ],
            )?;
        }
        // Dangling targets are skipped, keyed by the pre-remap endpoints
        // the dry run recorded.
        for (dep, orig_dep) in record.dependencies.iter().zip(&original.dependencies) {
            if skip_dangling.contains(&(original.id.clone(), orig_dep.to_id.clone())) {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO deps (from_id, to_id, dep_type, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    issue.id,
                    dep.to_id,
                    dep.dep_type.as_str(),
                    dep.created_at.to_rfc3339()
                ],
            )?;
        }

        // A pre-assigned child suffix must never be reissued by the counter
        if let (Some(parent), Some(suffix)) = (id::parent_id_of(&issue.id), child_suffix(&issue.id))
        {
            crate::db::counters::raise_counter_to(&tx, parent, suffix)?;
        }

        let event = Event::new(issue.id.clone(), EventKind::Created, actor.to_string())
            .with_values(None, Some(issue.title.clone()));
        crate::db::events::log_event_tx(&tx, &event)?;
        crate::db::dirty::mark_dirty_tx(&tx, &issue.id)?;

        report.new_ids.push(issue.id.clone());
    }

    tx.commit()?;

    report.remapped = mapping;
    report.applied = true;
    Ok(report)
}

/// Scalar-field diff between the local issue and an incoming record.
/// Collection differences are summarised by count.
fn diff_record(store: &Store, record: &JournalRecord) -> Result<Vec<FieldDiff>> {
    let local = store.get_issue(&record.id)?;
    let incoming = record.to_issue();
    let mut diffs = Vec::new();

    let mut push = |field: &str, local: String, incoming: String| {
        if local != incoming {
            diffs.push(FieldDiff {
                field: field.to_string(),
                local,
                incoming,
            });
        }
    };

    push("title", local.title.clone(), incoming.title.clone());
    push(
        "description",
        opt_str(&local.description),
        opt_str(&incoming.description),
    );
    push("design", opt_str(&local.design), opt_str(&incoming.design));
    push("notes", opt_str(&local.notes), opt_str(&incoming.notes));
    push(
        "acceptance_criteria",
        opt_str(&local.acceptance_criteria),
        opt_str(&incoming.acceptance_criteria),
    );
    push(
        "status",
        local.status.to_string(),
        incoming.status.to_string(),
    );
    push(
        "priority",
        local.priority.to_string(),
        incoming.priority.to_string(),
    );
    push(
        "issue_type",
        local.issue_type.to_string(),
        incoming.issue_type.to_string(),
    );
    push(
        "assignee",
        opt_str(&local.assignee),
        opt_str(&incoming.assignee),
    );
    push(
        "external_ref",
        opt_str(&local.external_ref),
        opt_str(&incoming.external_ref),
    );
    push(
        "created_at",
        local.created_at.to_rfc3339(),
        incoming.created_at.to_rfc3339(),
    );
    push(
        "updated_at",
        local.updated_at.to_rfc3339(),
        incoming.updated_at.to_rfc3339(),
    );

    let local_labels = store.get_labels(&record.id)?;
    let mut incoming_labels = record.labels.clone();
    incoming_labels.sort();
    if local_labels != incoming_labels {
        diffs.push(FieldDiff {
            field: "labels".into(),
            local: format!("{} labels", local_labels.len()),
            incoming: format!("{} labels", incoming_labels.len()),
        });
    }

    let local_deps = store.get_deps_from(&record.id)?;
    let local_set: HashSet<(String, String)> = local_deps
        .iter()
        .map(|d| (d.to_id.clone(), d.dep_type.to_string()))
        .collect();
    let incoming_set: HashSet<(String, String)> = record
        .dependencies
        .iter()
        .map(|d| (d.to_id.clone(), d.dep_type.to_string()))
        .collect();
    if local_set != incoming_set {
        diffs.push(FieldDiff {
            field: "dependencies".into(),
            local: format!("{} edges", local_set.len()),
            incoming: format!("{} edges", incoming_set.len()),
        });
    }

    let local_comments = store.get_comments(&record.id)?;
    if local_comments.len() != record.comments.len() {
        diffs.push(FieldDiff {
            field: "comments".into(),
            local: format!("{} comments", local_comments.len()),
            incoming: format!("{} comments", record.comments.len()),
        });
    }

    Ok(diffs)
}

fn opt_str(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

/// The numeric suffix of a child ID (`bd-a3f8.4` -> 4).
fn child_suffix(child_id: &str) -> Option<i64> {
    child_id.rsplit('.').next()?.parse().ok()
}

/// Rewrite a record under the collision mapping: its own ID, hierarchical
/// child prefixes, dependency endpoints, and textual ID mentions.
fn rewrite_record(record: &JournalRecord, mapping: &BTreeMap<String, String>) -> JournalRecord {
    if mapping.is_empty() {
        return record.clone();
    }

    let mut out = record.clone();
    out.id = remap_id(&out.id, mapping);
    for dep in &mut out.dependencies {
        dep.to_id = remap_id(&dep.to_id, mapping);
    }
    out.description = out.description.map(|t| rewrite_text(&t, mapping));
    out.design = out.design.map(|t| rewrite_text(&t, mapping));
    out.notes = out.notes.map(|t| rewrite_text(&t, mapping));
    out.acceptance_criteria = out.acceptance_criteria.map(|t| rewrite_text(&t, mapping));
    out.external_ref = out.external_ref.map(|t| rewrite_text(&t, mapping));
    out
}

/// Map an ID through the collision mapping, including hierarchical
/// children of a remapped parent (`old.1` -> `new.1`).
fn remap_id(id: &str, mapping: &BTreeMap<String, String>) -> String {
    if let Some(new) = mapping.get(id) {
        return new.clone();
    }
    for (old, new) in mapping {
        if let Some(rest) = id.strip_prefix(old.as_str()) {
            if rest.starts_with('.') {
                return format!("{new}{rest}");
            }
        }
    }
    id.to_string()
}

/// Replace whole-token mentions of remapped IDs in freeform text.
fn rewrite_text(text: &str, mapping: &BTreeMap<String, String>) -> String {
    let mut out = text.to_string();
    for (old, new) in mapping {
        let pattern = format!(r"\b{}\b", regex::escape(old));
        if let Ok(re) = Regex::new(&pattern) {
            out = re.replace_all(&out, new.as_str()).into_owned();
        }
    }
    out
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
