// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use beads_core::db::Store;
use beads_core::migrate;

use crate::cli::MigrateArgs;
use crate::error::{Error, Result};
use crate::lifecycle;

use super::Context;

pub fn run(ctx: &Context, args: MigrateArgs) -> Result<()> {
    let paths = ctx.paths()?;

    // The migration rewrites every primary key; it needs the only
    // writable handle
    if lifecycle::detect_daemon(paths)?.is_some() {
        return Err(Error::Usage(
            "stop the daemon before migrating (bd daemon stop)".into(),
        ));
    }

    let mut store = Store::open(&paths.db_path())?;

    if args.dry_run {
        let mapping = migrate::plan(&store)?;
        if ctx.json {
            println!("{}", serde_json::to_string_pretty(&mapping)?);
        } else if mapping.is_empty() {
            println!("Nothing to migrate");
        } else {
            println!("Would migrate {} issues:", mapping.len());
            for (old, new) in &mapping {
                println!("  {old} -> {new}");
            }
        }
        return Ok(());
    }

    let backup = paths.backup_db()?;
    let mapping = migrate::run(&mut store)?;

    if mapping.is_empty() {
        let _ = std::fs::remove_file(&backup);
        if !ctx.json {
            println!("Nothing to migrate");
        }
        return Ok(());
    }

    migrate::save_mapping(&paths.mapping_path(), &mapping)?;
    // The journal must follow the new IDs immediately
    beads_core::journal::export(&store, &paths.journal_path())?;
    store.drain_dirty()?;

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "migrated": mapping.len(),
                "mapping": mapping,
                "backup": backup,
            })
        );
    } else {
        println!("Migrated {} issues to hash IDs", mapping.len());
        println!("Backup: {}", backup.display());
        println!("Mapping: {}", paths.mapping_path().display());
    }
    Ok(())
}
