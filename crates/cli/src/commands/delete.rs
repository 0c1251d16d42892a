// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::IdArg;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: IdArg) -> Result<()> {
    let mut client = ctx.client()?;
    let id = client.resolve_id(&args.id)?;
    client.delete(&id)?;

    if ctx.json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted {id}");
    }
    Ok(())
}
