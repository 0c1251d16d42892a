// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use beads_core::db::Store;
use beads_core::paths::{BeadsPaths, STATE_DIR};

use crate::cli::InitArgs;
use crate::error::{Error, Result};

use super::Context;

pub fn run(ctx: &Context, args: InitArgs) -> Result<()> {
    // Init works from the raw working directory; discovery is for every
    // other command
    let state_dir = match &ctx.paths_result {
        Ok(paths) => paths.state_dir.clone(),
        Err(_) => PathBuf::from(STATE_DIR),
    };

    if state_dir.join(beads_core::paths::DB_NAME).exists() {
        return Err(Error::Usage(format!(
            "already initialized at {}",
            state_dir.display()
        )));
    }

    std::fs::create_dir_all(&state_dir)?;
    let paths = BeadsPaths::at(state_dir);

    let mut store = Store::open(&paths.db_path())?;
    store.set_config("issue_prefix", &args.prefix)?;

    // An empty journal marks the directory as tracked from day one
    beads_core::journal::write_atomic(&paths.journal_path(), &[])?;

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "initialized": paths.state_dir,
                "prefix": args.prefix,
            })
        );
    } else {
        println!(
            "Initialized beads database at {} (prefix: {})",
            paths.state_dir.display(),
            args.prefix
        );
    }
    Ok(())
}
