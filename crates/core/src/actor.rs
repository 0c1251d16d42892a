// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Actor detection for the event log.
//!
//! Determines the current user's display name for stamping events when the
//! caller does not pass `--actor`.

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;

use std::process::Command;

/// Returns the current user's display name for audit purposes.
///
/// Resolution order:
/// 1. `BEADS_ACTOR` env var
/// 2. Git config user.name (display name only, never email)
/// 3. Unix username from USER or LOGNAME env var (if not a system account)
/// 4. Fallback to "human"
pub fn current_actor() -> String {
    if let Ok(actor) = std::env::var("BEADS_ACTOR") {
        if !actor.trim().is_empty() {
            return actor;
        }
    }

    if let Some(name) = git_user_name() {
        return name;
    }

    if let Some(name) = unix_username() {
        if !is_system_account(&name) {
            return name;
        }
    }

    "human".to_string()
}

fn git_user_name() -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--get", "user.name"])
        .output()
        .ok()?;

    if output.status.success() {
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !name.is_empty() {
            return Some(name);
        }
    }
    None
}

fn unix_username() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok()
        .filter(|s| !s.is_empty())
}

fn is_system_account(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "root" | "system" | "administrator" | "admin" | "daemon" | "nobody"
    )
}
