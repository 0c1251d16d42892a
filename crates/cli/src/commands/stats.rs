// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let mut client = ctx.client()?;
    let stats = client.stats()?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("issues:       {}", stats.total);
    println!("  open:        {}", stats.open);
    println!("  in_progress: {}", stats.in_progress);
    println!("  blocked:     {}", stats.blocked);
    println!("  closed:      {}", stats.closed);
    println!("dependencies: {}", stats.dependencies);
    println!("labels:       {}", stats.labels);
    println!("comments:     {}", stats.comments);
    println!("dirty:        {}", stats.dirty);
    Ok(())
}
