// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use beads_core::UpdatePatch;

use crate::cli::UpdateArgs;
use crate::display::format_issue_line;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, args: UpdateArgs) -> Result<()> {
    let mut client = ctx.client()?;
    let id = client.resolve_id(&args.id)?;

    let patch = UpdatePatch {
        title: args.title,
        description: args.description,
        design: args.design,
        notes: args.notes,
        acceptance_criteria: args.acceptance_criteria,
        status: args.status,
        priority: args.priority,
        issue_type: args.issue_type,
        assignee: args.assignee,
        external_ref: args.external_ref,
        source_location: args.source_location,
        estimate: args.estimate,
    };

    let issue = client.update(&id, patch, &ctx.actor)?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&issue)?);
    } else {
        println!("{}", format_issue_line(&issue));
    }
    Ok(())
}
