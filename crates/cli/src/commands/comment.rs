// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::CommentArgs;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: CommentArgs) -> Result<()> {
    let mut client = ctx.client()?;
    let id = client.resolve_id(&args.id)?;

    match args.text {
        Some(text) => {
            client.add_comment(&id, &ctx.actor, &text)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "id": id, "commented": true }));
            } else {
                println!("Commented on {id}");
            }
        }
        None => {
            let comments = client.get_comments(&id)?;
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&comments)?);
            } else if comments.is_empty() {
                println!("No comments on {id}");
            } else {
                for comment in &comments {
                    println!(
                        "[{}] {}: {}",
                        comment.created_at.format("%Y-%m-%d %H:%M"),
                        comment.author,
                        comment.text
                    );
                }
            }
        }
    }
    Ok(())
}
