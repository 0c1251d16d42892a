// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use beads_core::NewIssue;

use crate::cli::CreateArgs;
use crate::display::format_issue_line;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: CreateArgs) -> Result<()> {
    let mut client = ctx.client()?;

    let parent = match &args.parent {
        Some(p) => Some(client.resolve_id(p)?),
        None => None,
    };

    let new = NewIssue {
        title: args.title,
        description: args.description,
        design: args.design,
        notes: args.notes,
        acceptance_criteria: args.acceptance_criteria,
        priority: args.priority.unwrap_or(2),
        issue_type: args.issue_type.unwrap_or_default(),
        assignee: args.assignee,
        external_ref: args.external_ref,
        source_location: args.source_location,
        estimate: args.estimate,
        parent,
    };

    let issue = client.create(new, &ctx.actor)?;
    for label in &args.labels {
        client.add_label(&issue.id, label, &ctx.actor)?;
    }

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&issue)?);
    } else {
        println!("{}", format_issue_line(&issue));
    }
    Ok(())
}
