// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value configuration persisted alongside the issues.
//!
//! Recognised keys: `issue_prefix`, `max_collision_prob`,
//! `min_hash_length`, `max_hash_length`.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::id;

use super::Store;

/// Defaults applied when a key is absent.
pub const DEFAULT_PREFIX: &str = "bd";
pub const DEFAULT_MAX_COLLISION_PROB: f64 = 0.25;
pub const DEFAULT_MIN_HASH_LENGTH: usize = 4;
pub const DEFAULT_MAX_HASH_LENGTH: usize = 12;

/// Read a config value inside an existing statement scope.
pub(crate) fn get_config_tx(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM config WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// The identity allocator's tuning knobs, resolved from config.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IdConfig {
    pub prefix: String,
    pub max_collision_prob: f64,
    pub min_hash_length: usize,
    pub max_hash_length: usize,
}

/// Resolve the allocator configuration, applying defaults for absent or
/// unparseable values.
pub(crate) fn id_config(conn: &Connection) -> Result<IdConfig> {
    let prefix = get_config_tx(conn, "issue_prefix")?.unwrap_or_else(|| DEFAULT_PREFIX.into());
    let max_collision_prob = get_config_tx(conn, "max_collision_prob")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_COLLISION_PROB);
    let min_hash_length = get_config_tx(conn, "min_hash_length")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MIN_HASH_LENGTH);
    let max_hash_length = get_config_tx(conn, "max_hash_length")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_HASH_LENGTH);

    Ok(IdConfig {
        prefix,
        max_collision_prob,
        min_hash_length: min_hash_length.max(1),
        max_hash_length: max_hash_length.max(min_hash_length.max(1)),
    })
}

impl Store {
    /// Set a config value, replacing any previous one.
    pub fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        if key == "issue_prefix" && !id::validate_prefix(value) {
            return Err(Error::InvalidPrefix);
        }
        self.conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Get a config value.
    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        get_config_tx(&self.conn, key)
    }

    /// The configured issue prefix, defaulting to `bd`.
    pub fn issue_prefix(&self) -> Result<String> {
        Ok(get_config_tx(&self.conn, "issue_prefix")?.unwrap_or_else(|| DEFAULT_PREFIX.into()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
