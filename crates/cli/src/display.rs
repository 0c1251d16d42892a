// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text rendering. Colour and layout stay out of the core; this is
//! the minimal surface agents and shell pipelines consume.

use beads_core::planner::TreeNode;
use beads_core::{Comment, Event, Issue};

/// One-line summary: `bd-a3f8 [P1] [task] open       Fix the parser`.
pub fn format_issue_line(issue: &Issue) -> String {
    format!(
        "{:<14} [P{}] [{}] {:<11} {}",
        issue.id, issue.priority, issue.issue_type, issue.status, issue.title
    )
}

/// Multi-line detail block for `bd show`.
pub fn format_issue_detail(
    issue: &Issue,
    labels: &[String],
    comments: &[Comment],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}: {}\n", issue.id, issue.title));
    out.push_str(&format!(
        "  status: {}  priority: P{}  type: {}\n",
        issue.status, issue.priority, issue.issue_type
    ));
    if let Some(assignee) = &issue.assignee {
        out.push_str(&format!("  assignee: {assignee}\n"));
    }
    if !labels.is_empty() {
        out.push_str(&format!("  labels: {}\n", labels.join(", ")));
    }
    out.push_str(&format!("  created: {}\n", issue.created_at.to_rfc3339()));
    out.push_str(&format!("  updated: {}\n", issue.updated_at.to_rfc3339()));
    if let Some(closed) = issue.closed_at {
        out.push_str(&format!("  closed: {}\n", closed.to_rfc3339()));
    }
    if let Some(ext) = &issue.external_ref {
        out.push_str(&format!("  external: {ext}\n"));
    }
    if let Some(loc) = &issue.source_location {
        out.push_str(&format!("  source: {loc}\n"));
    }
    if let Some(est) = issue.estimate {
        out.push_str(&format!("  estimate: {est}\n"));
    }
    for (name, text) in [
        ("description", &issue.description),
        ("design", &issue.design),
        ("notes", &issue.notes),
        ("acceptance", &issue.acceptance_criteria),
    ] {
        if let Some(text) = text {
            out.push_str(&format!("\n{name}:\n{text}\n"));
        }
    }
    if !comments.is_empty() {
        out.push_str("\ncomments:\n");
        for comment in comments {
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.author,
                comment.text
            ));
        }
    }
    out
}

/// Event log lines for `bd show --events`.
pub fn format_events(events: &[Event]) -> String {
    let mut out = String::from("\nevents:\n");
    for event in events {
        let detail = match (&event.before, &event.after) {
            (Some(b), Some(a)) => format!(" {b} -> {a}"),
            (None, Some(a)) => format!(" {a}"),
            (Some(b), None) => format!(" was {b}"),
            (None, None) => String::new(),
        };
        out.push_str(&format!(
            "  [{}] {} by {}{}\n",
            event.created_at.format("%Y-%m-%d %H:%M"),
            event.kind,
            event.actor,
            detail
        ));
    }
    out
}

/// Indented rendering of a dependency tree.
pub fn format_tree(node: &TreeNode) -> String {
    let mut out = String::new();
    render_tree(node, &mut out);
    out
}

fn render_tree(node: &TreeNode, out: &mut String) {
    let indent = "  ".repeat(node.depth);
    let edge = match node.dep_type {
        None => String::new(),
        Some(t) => {
            let arrow = match node.direction {
                beads_core::planner::Direction::Incoming => "<-",
                _ => "->",
            };
            format!("{arrow} [{t}] ")
        }
    };
    out.push_str(&format!("{indent}{edge}{}\n", node.id));
    for child in &node.children {
        render_tree(child, out);
    }
}
