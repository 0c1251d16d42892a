// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::cli::ExportArgs;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: ExportArgs) -> Result<()> {
    let paths = ctx.paths()?;
    let mut client = ctx.client()?;
    let text = client.export_text()?;

    let dest = args.file.unwrap_or_else(|| paths.journal_path());
    if dest == PathBuf::from("-") {
        print!("{text}");
        return Ok(());
    }

    // Same atomic discipline as the daemon's flush
    let tmp = dest.with_extension("jsonl.tmp");
    std::fs::write(&tmp, &text)?;
    std::fs::rename(&tmp, &dest)?;
    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "exported": dest,
                "lines": text.lines().count(),
            })
        );
    } else {
        println!("Exported {} issues to {}", text.lines().count(), dest.display());
    }
    Ok(())
}
