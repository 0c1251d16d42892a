// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::SearchArgs;
use crate::display::format_issue_line;
use crate::error::Result;

use super::{to_filter, Context};

pub fn run(ctx: &Context, args: SearchArgs) -> Result<()> {
    let mut client = ctx.client()?;
    let issues = client.search(&args.query, to_filter(&args.filter))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else if issues.is_empty() {
        println!("No matches");
    } else {
        for issue in &issues {
            println!("{}", format_issue_line(issue));
        }
    }
    Ok(())
}
