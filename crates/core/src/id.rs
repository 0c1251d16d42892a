// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Adaptive hash-ID allocation.
//!
//! Top-level issue IDs are `{prefix}-{hash}` where the hash is a SHA-256
//! digest truncated to an adaptive number of hex characters: the smallest
//! length whose expected collision probability over the current database
//! stays under the configured threshold. Small projects keep 4-char IDs;
//! the length widens as the database grows.
//!
//! Hierarchical children do not hash: they are `{parent}.{n}` from the
//! parent's monotonic child counter (see `db::counters`).

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::db::config::{id_config, IdConfig};
use crate::error::{Error, Result};

/// Nonce attempts per length before widening the hash by one character.
const NONCE_RETRIES: u64 = 16;

/// Validate that a prefix is usable in IDs
/// (2+ lowercase alphanumeric with at least one letter).
pub fn validate_prefix(prefix: &str) -> bool {
    prefix.len() >= 2
        && prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && prefix.chars().any(|c| c.is_ascii_lowercase())
}

/// Check if an ID is hash-based rather than sequential.
///
/// Sequential IDs (`bd-12`) have only digits after the namespace;
/// a hash ID contains at least one hex letter.
pub fn is_hash_id(id: &str) -> bool {
    match id.split_once('-') {
        Some((_, suffix)) => {
            let head = suffix.split('.').next().unwrap_or(suffix);
            !head.is_empty() && head.chars().any(|c| c.is_ascii_lowercase())
        }
        None => false,
    }
}

/// Check if an ID is a hierarchical child (`bd-a3f8.1`, `bd-a3f8.1.2`).
pub fn is_child_id(id: &str) -> bool {
    match id.split_once('-') {
        Some((_, suffix)) => suffix.contains('.'),
        None => false,
    }
}

/// The parent portion of a hierarchical child ID, if any.
pub fn parent_id_of(id: &str) -> Option<&str> {
    if !is_child_id(id) {
        return None;
    }
    id.rfind('.').map(|i| &id[..i])
}

/// Expected collision probability for n uniformly distributed hashes of
/// the given hex length (birthday approximation).
pub(crate) fn collision_probability(n: u64, hex_len: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let space = 16f64.powi(hex_len as i32);
    let pairs = (n as f64) * ((n - 1) as f64) / 2.0;
    1.0 - (-pairs / space).exp()
}

/// Pick the smallest hash length whose collision probability over n
/// existing IDs stays within the configured threshold.
pub(crate) fn pick_hash_length(n: u64, cfg: &IdConfig) -> usize {
    for len in cfg.min_hash_length..=cfg.max_hash_length {
        if collision_probability(n, len) <= cfg.max_collision_prob {
            return len;
        }
    }
    cfg.max_hash_length
}

/// SHA-256 over `content`, truncated to `hex_len` hex characters.
pub(crate) fn hash_hex(content: &str, hex_len: usize) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(hex_len);
    hex
}

/// The content tuple hashed for an issue ID.
pub(crate) fn hash_content(
    title: &str,
    description: Option<&str>,
    actor: &str,
    created_at: DateTime<Utc>,
    nonce: u64,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        title,
        description.unwrap_or(""),
        actor,
        created_at.timestamp_nanos_opt().unwrap_or_default(),
        nonce
    )
}

/// Allocate a fresh top-level hash ID inside the caller's transaction.
///
/// Counts existing top-level IDs under the configured prefix, picks the
/// adaptive length, then probes nonces; after a bounded number of
/// collisions the length widens by one.
pub(crate) fn allocate_hash_id(
    conn: &Connection,
    title: &str,
    description: Option<&str>,
    actor: &str,
    created_at: DateTime<Utc>,
) -> Result<String> {
    let cfg = id_config(conn)?;
    let n = count_top_level(conn, &cfg.prefix)?;
    let start_len = pick_hash_length(n, &cfg);

    for len in start_len..=cfg.max_hash_length {
        for nonce in 0..NONCE_RETRIES {
            let content = hash_content(title, description, actor, created_at, nonce);
            let candidate = format!("{}-{}", cfg.prefix, hash_hex(&content, len));
            if !crate::db::issues::issue_exists_tx(conn, &candidate)? {
                return Ok(candidate);
            }
        }
    }

    Err(Error::InvalidInput(format!(
        "exhausted hash candidates at length {}; raise max_hash_length",
        cfg.max_hash_length
    )))
}

/// Count existing top-level IDs (no hierarchical suffix) under a prefix.
pub(crate) fn count_top_level(conn: &Connection, prefix: &str) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM issues
         WHERE id LIKE ?1 || '-%' AND id NOT LIKE '%.%'",
        rusqlite::params![prefix],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
