// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Migration from sequential IDs (`bd-1`, `bd-2`) to hash IDs.
//!
//! Top-level issues receive deterministic hashes derived from
//! `(title|description|"system"|created_at_nanos|nonce)`; children of
//! epics become `{parent_hash}.{n}` in creation order. Every reference is
//! rewritten: dependency endpoints, comments, events, labels, the dirty
//! set, and textual `{prefix}-{digits}` mentions inside the freeform
//! fields. The commit pass runs in one transaction and produces a mapping
//! for audit.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use regex::Regex;
use serde::Serialize;

use crate::db::Store;
use crate::error::{Error, Result};
use crate::id;
use crate::issue::{DepType, Issue};

/// Actor recorded on migration events; also the hash-content actor so the
/// assigned IDs are deterministic.
const MIGRATION_ACTOR: &str = "system";

/// Hex length of migration-assigned hashes.
const MIGRATION_HASH_LEN: usize = 8;

/// Compute the old-ID to new-ID mapping without mutating the store.
///
/// Returns an empty mapping when the store is empty or already uses hash
/// IDs.
pub fn plan(store: &Store) -> Result<BTreeMap<String, String>> {
    let mut issues = store.get_all_issues()?;
    if issues.is_empty() || issues.iter().all(|i| id::is_hash_id(&i.id)) {
        return Ok(BTreeMap::new());
    }

    creation_order(&mut issues);

    let parent_map = build_parent_map(store, &issues)?;
    let prefix = store.issue_prefix()?;

    let mut mapping: BTreeMap<String, String> = BTreeMap::new();
    let mut assigned: std::collections::HashSet<String> = std::collections::HashSet::new();

    // First pass: top-level issues get deterministic hashes
    for issue in &issues {
        if parent_map.contains_key(&issue.id) {
            continue;
        }
        let mut nonce = 0u64;
        let hash_id = loop {
            let content = id::hash_content(
                &issue.title,
                issue.description.as_deref(),
                MIGRATION_ACTOR,
                issue.created_at,
                nonce,
            );
            let candidate = format!("{}-{}", prefix, id::hash_hex(&content, MIGRATION_HASH_LEN));
            if assigned.insert(candidate.clone()) {
                break candidate;
            }
            nonce += 1;
        };
        mapping.insert(issue.id.clone(), hash_id);
    }

    // Second pass: children in creation order, walking nesting levels
    // until every parent has been mapped
    let mut counters: BTreeMap<String, i64> = BTreeMap::new();
    loop {
        let mut progressed = false;
        for issue in &issues {
            if mapping.contains_key(&issue.id) {
                continue;
            }
            let Some(parent_id) = parent_map.get(&issue.id) else {
                continue;
            };
            let Some(parent_hash) = mapping.get(parent_id).cloned() else {
                continue; // parent not mapped yet; later pass
            };
            let n = counters.entry(parent_hash.clone()).or_insert(0);
            *n += 1;
            mapping.insert(issue.id.clone(), format!("{parent_hash}.{n}"));
            progressed = true;
        }
        if mapping.len() == issues.len() {
            break;
        }
        if !progressed {
            return Err(Error::Corrupt(
                "parent-child graph has a child with no reachable parent".into(),
            ));
        }
    }

    Ok(mapping)
}

/// Apply the migration in one transaction and return the mapping.
pub fn run(store: &mut Store) -> Result<BTreeMap<String, String>> {
    let mapping = plan(store)?;
    if mapping.is_empty() {
        return Ok(mapping);
    }

    let mut issues = store.get_all_issues()?;
    creation_order(&mut issues);

    let prefix = store.issue_prefix()?;
    let reference = reference_pattern(&prefix)?;

    let tx = store.write_tx()?;
    for issue in &issues {
        let new_id = mapping
            .get(&issue.id)
            .ok_or_else(|| Error::Corrupt(format!("no mapping for {}", issue.id)))?;

        let mut updated = issue.clone();
        updated.description = rewrite_refs(updated.description, &reference, &mapping);
        updated.design = rewrite_refs(updated.design, &reference, &mapping);
        updated.notes = rewrite_refs(updated.notes, &reference, &mapping);
        updated.acceptance_criteria = rewrite_refs(updated.acceptance_criteria, &reference, &mapping);
        updated.external_ref = rewrite_refs(updated.external_ref, &reference, &mapping);

        crate::db::issues::update_id_tx(&tx, &issue.id, new_id, &updated, MIGRATION_ACTOR)?;
    }

    // Counters must cover the highest suffix each parent received
    let mut highest: BTreeMap<&str, i64> = BTreeMap::new();
    for new_id in mapping.values() {
        if let (Some(parent), Some(suffix)) = (id::parent_id_of(new_id), suffix_of(new_id)) {
            let entry = highest.entry(parent).or_insert(0);
            *entry = (*entry).max(suffix);
        }
    }
    for (parent, floor) in highest {
        crate::db::counters::raise_counter_to(&tx, parent, floor)?;
    }

    tx.commit()?;
    Ok(mapping)
}

/// Creation order drives child numbering. Sequential IDs tie-break
/// numerically so `bd-2` precedes `bd-10` under equal timestamps.
fn creation_order(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        (a.created_at, seq_number(&a.id), &a.id).cmp(&(b.created_at, seq_number(&b.id), &b.id))
    });
}

/// The numeric tail of a sequential ID (`bd-12` -> 12), if any.
fn seq_number(id: &str) -> i64 {
    id.split_once('-')
        .and_then(|(_, tail)| tail.parse().ok())
        .unwrap_or(i64::MAX)
}

/// Child to parent, derived from parent-child dependency edges.
fn build_parent_map(store: &Store, issues: &[Issue]) -> Result<BTreeMap<String, String>> {
    let mut parent_map = BTreeMap::new();
    for issue in issues {
        for dep in store.get_deps_from(&issue.id)? {
            if dep.dep_type == DepType::ParentChild {
                parent_map.insert(issue.id.clone(), dep.to_id.clone());
            }
        }
    }
    Ok(parent_map)
}

/// Matches sequential references like `bd-12` and `bd-12.3` as whole tokens.
fn reference_pattern(prefix: &str) -> Result<Regex> {
    Regex::new(&format!(
        r"\b{}-\d+(?:\.\d+)*\b",
        regex::escape(prefix)
    ))
    .map_err(|e| Error::InvalidInput(format!("bad prefix pattern: {e}")))
}

/// Replace mapped ID mentions in a freeform field; unmapped IDs stay.
fn rewrite_refs(
    text: Option<String>,
    pattern: &Regex,
    mapping: &BTreeMap<String, String>,
) -> Option<String> {
    text.map(|t| {
        pattern
            .replace_all(&t, |caps: &regex::Captures| {
                let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                mapping.get(m).cloned().unwrap_or_else(|| m.to_string())
            })
            .into_owned()
    })
}

fn suffix_of(id: &str) -> Option<i64> {
    id.rsplit('.').next()?.parse().ok()
}

/// Serialisable mapping file written next to the database for audit.
#[derive(Debug, Serialize)]
struct MappingFile<'a> {
    migrated_at: String,
    count: usize,
    mapping: Vec<MappingEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct MappingEntry<'a> {
    old_id: &'a str,
    new_id: &'a str,
}

/// Save the mapping as pretty JSON, sorted by old ID.
pub fn save_mapping(path: &Path, mapping: &BTreeMap<String, String>) -> Result<()> {
    let entries: Vec<MappingEntry> = mapping
        .iter()
        .map(|(old, new)| MappingEntry {
            old_id: old,
            new_id: new,
        })
        .collect();

    let file = MappingFile {
        migrated_at: Utc::now().to_rfc3339(),
        count: entries.len(),
        mapping: entries,
    };

    std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}

#[cfg(test)]
#[path = "migrate_tests.rs"]
mod tests;
