// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::ShowArgs;
use crate::display::{format_events, format_issue_detail};
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: ShowArgs) -> Result<()> {
    let mut client = ctx.client()?;
    let id = client.resolve_id(&args.id)?;

    let issue = client.get(&id)?;
    let labels = client.get_labels(&id)?;
    let comments = client.get_comments(&id)?;

    if ctx.json {
        let mut value = serde_json::to_value(&issue)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("labels".into(), serde_json::to_value(&labels)?);
            obj.insert("comments".into(), serde_json::to_value(&comments)?);
            if args.events {
                let events = client.get_events(&id)?;
                obj.insert("events".into(), serde_json::to_value(&events)?);
            }
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_issue_detail(&issue, &labels, &comments));
        if args.events {
            print!("{}", format_events(&client.get_events(&id)?));
        }
    }
    Ok(())
}
