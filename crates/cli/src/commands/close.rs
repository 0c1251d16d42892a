// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::CloseArgs;
use crate::display::format_issue_line;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: CloseArgs) -> Result<()> {
    let mut client = ctx.client()?;
    let id = client.resolve_id(&args.id)?;
    let issue = client.close(&id, &ctx.actor, args.reason.as_deref())?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&issue)?);
    } else {
        println!("{}", format_issue_line(&issue));
    }
    Ok(())
}
