// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::{parse_dep_type_arg, DepAction, DepArgs};
use crate::display::format_tree;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: DepArgs) -> Result<()> {
    let mut client = ctx.client()?;

    match args.action {
        DepAction::Add { from, to, dep_type } => {
            let (dep_type, swap) = parse_dep_type_arg(&dep_type)?;
            let from = client.resolve_id(&from)?;
            let to = client.resolve_id(&to)?;
            // "X blocked-by Y" stores as "Y blocks X"
            let (from, to) = if swap { (to, from) } else { (from, to) };
            client.add_dep(&from, &to, dep_type, &ctx.actor)?;
            if ctx.json {
                println!(
                    "{}",
                    serde_json::json!({ "from": from, "to": to, "dep_type": dep_type })
                );
            } else {
                println!("{from} {dep_type} {to}");
            }
        }
        DepAction::Remove { from, to, dep_type } => {
            let (dep_type, swap) = parse_dep_type_arg(&dep_type)?;
            let from = client.resolve_id(&from)?;
            let to = client.resolve_id(&to)?;
            let (from, to) = if swap { (to, from) } else { (from, to) };
            client.remove_dep(&from, &to, dep_type, &ctx.actor)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "removed": true }));
            } else {
                println!("Removed {from} {dep_type} {to}");
            }
        }
        DepAction::Tree { id, depth } => {
            let id = client.resolve_id(&id)?;
            let tree = client.tree(&id, depth)?;
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print!("{}", format_tree(&tree));
            }
        }
    }
    Ok(())
}
