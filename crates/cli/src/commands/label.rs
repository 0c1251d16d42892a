// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::{LabelAction, LabelArgs};
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: LabelArgs) -> Result<()> {
    let mut client = ctx.client()?;

    match args.action {
        LabelAction::Add { id, label } => {
            let id = client.resolve_id(&id)?;
            client.add_label(&id, &label, &ctx.actor)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "id": id, "added": label }));
            } else {
                println!("Labelled {id} with {label}");
            }
        }
        LabelAction::Remove { id, label } => {
            let id = client.resolve_id(&id)?;
            client.remove_label(&id, &label, &ctx.actor)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "id": id, "removed": label }));
            } else {
                println!("Removed {label} from {id}");
            }
        }
        LabelAction::ListAll => {
            let counts = client.list_all_labels()?;
            if ctx.json {
                let map: std::collections::BTreeMap<_, _> = counts.iter().cloned().collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else if counts.is_empty() {
                println!("No labels");
            } else {
                for (label, count) in &counts {
                    println!("{label:<24} {count}");
                }
            }
        }
    }
    Ok(())
}
