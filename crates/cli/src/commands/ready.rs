// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::ReadyArgs;
use crate::display::format_issue_line;
use crate::error::Result;

use super::{to_filter, Context};

pub fn run(ctx: &Context, args: ReadyArgs) -> Result<()> {
    let mut client = ctx.client()?;
    let ready = client.ready(to_filter(&args.filter))?;

    if ctx.json {
        let mut value = serde_json::json!({ "ready": ready });
        if args.blocked {
            let blocked = client.blocked(to_filter(&args.filter))?;
            value["blocked"] = serde_json::to_value(&blocked)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if ready.is_empty() {
        println!("No ready issues");
    } else {
        for issue in &ready {
            println!("{}", format_issue_line(issue));
        }
    }

    if args.blocked {
        let blocked = client.blocked(to_filter(&args.filter))?;
        if !blocked.is_empty() {
            println!("\nblocked:");
            for info in &blocked {
                println!("{}  ({})", format_issue_line(&info.issue), info.reason);
            }
        }
    }
    Ok(())
}
