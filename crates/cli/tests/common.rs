// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

/// A bd command rooted in the given directory with a fixed actor.
pub fn bd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bd").unwrap();
    cmd.current_dir(dir)
        .env_remove("BEADS_DB")
        .env("BEADS_ACTOR", "test-actor");
    cmd
}

/// Initialize a project in the directory.
pub fn init(dir: &Path) {
    bd(dir).arg("init").assert().success();
}

/// Create an issue and return its allocated ID.
pub fn create(dir: &Path, title: &str, extra: &[&str]) -> String {
    let output = bd(dir)
        .args(["--json", "create", title])
        .args(extra)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value["id"].as_str().unwrap().to_string()
}
