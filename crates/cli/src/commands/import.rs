// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use beads_core::import::ImportOptions;

use crate::cli::ImportArgs;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: ImportArgs) -> Result<()> {
    let paths = ctx.paths()?;
    let file = args.file.unwrap_or_else(|| paths.journal_path());
    let text = std::fs::read_to_string(&file)?;

    let opts = ImportOptions {
        resolve_collisions: args.resolve_collisions,
        strict: args.strict,
    };

    let mut client = ctx.client()?;
    // Dry-run first so the report precedes any mutation
    let preview = client.import_text(&text, opts, true, &ctx.actor)?;

    let report = if args.dry_run {
        preview
    } else {
        client.import_text(&text, opts, false, &ctx.actor)?
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let verb = if report.applied { "Imported" } else { "Would import" };
    println!(
        "{verb} {} new, {} idempotent, {} colliding",
        report.new_count(),
        report.idempotent,
        report.collisions.len()
    );
    for collision in &report.collisions {
        println!("  collision on {}:", collision.id);
        for diff in &collision.diffs {
            println!(
                "    {}: local={:?} incoming={:?}",
                diff.field, diff.local, diff.incoming
            );
        }
    }
    for (old, new) in &report.remapped {
        println!("  remapped {old} -> {new}");
    }
    for (from, to) in &report.dangling {
        println!("  dangling: {from} -> {to}");
    }
    Ok(())
}
