// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use beads_core::issue::parse_priority;
use beads_core::{DepType, IssueType, Status};

/// bd - a dependency-aware issue tracker for agents and humans.
#[derive(Debug, Parser)]
#[command(name = "bd", version, about)]
pub struct Cli {
    /// Database path (overrides BEADS_DB and upward discovery)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Actor recorded in the event log (default: detected user)
    #[arg(long, global = true, value_name = "NAME")]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize a .beads directory in the current project
    Init(InitArgs),
    /// Create a new issue
    Create(CreateArgs),
    /// Show an issue with its labels, dependencies, and comments
    Show(ShowArgs),
    /// Update fields of an issue
    Update(UpdateArgs),
    /// Close an issue
    Close(CloseArgs),
    /// Reopen a closed issue
    Reopen(IdArg),
    /// Delete an issue and everything attached to it
    Delete(IdArg),
    /// List issues with filters
    List(FilterArgs),
    /// Search issues by substring over title and description
    Search(SearchArgs),
    /// Show issues that are ready to work on
    Ready(ReadyArgs),
    /// Manage dependencies between issues
    Dep(DepArgs),
    /// Manage labels
    Label(LabelArgs),
    /// Add or list comments
    Comment(CommentArgs),
    /// Import a journal file into the store
    Import(ImportArgs),
    /// Export the store to the journal
    Export(ExportArgs),
    /// Show store statistics
    Stats,
    /// Control the beadsd daemon
    Daemon(DaemonArgs),
    /// Migrate sequential IDs (bd-1) to hash IDs (bd-a3f8e9a2)
    MigrateHashIds(MigrateArgs),
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Issue ID prefix for this project
    #[arg(long, default_value = "bd")]
    pub prefix: String,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Issue title
    pub title: String,

    #[arg(short = 'd', long)]
    pub description: Option<String>,

    #[arg(long)]
    pub design: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long = "acceptance")]
    pub acceptance_criteria: Option<String>,

    /// Priority 0 (highest) through 4, or a name like "high"
    #[arg(short = 'p', long, value_parser = priority_value)]
    pub priority: Option<u8>,

    /// Issue type: bug, feature, task, epic, chore
    #[arg(short = 't', long = "type", value_parser = type_value)]
    pub issue_type: Option<IssueType>,

    #[arg(long)]
    pub assignee: Option<String>,

    #[arg(long)]
    pub external_ref: Option<String>,

    #[arg(long)]
    pub source_location: Option<String>,

    #[arg(long)]
    pub estimate: Option<i64>,

    /// Create as a hierarchical child of this issue
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,

    /// Labels to attach (repeatable)
    #[arg(short = 'l', long = "label")]
    pub labels: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Issue ID or unambiguous prefix
    pub id: String,

    /// Include the event log
    #[arg(long)]
    pub events: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Issue ID or unambiguous prefix
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// New description (empty string clears)
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    #[arg(long)]
    pub design: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long = "acceptance")]
    pub acceptance_criteria: Option<String>,

    /// New status: open, in_progress, blocked, closed
    #[arg(short = 's', long, value_parser = status_value)]
    pub status: Option<Status>,

    #[arg(short = 'p', long, value_parser = priority_value)]
    pub priority: Option<u8>,

    #[arg(short = 't', long = "type", value_parser = type_value)]
    pub issue_type: Option<IssueType>,

    #[arg(long)]
    pub assignee: Option<String>,

    #[arg(long)]
    pub external_ref: Option<String>,

    #[arg(long)]
    pub source_location: Option<String>,

    #[arg(long)]
    pub estimate: Option<i64>,
}

#[derive(Debug, Args)]
pub struct CloseArgs {
    /// Issue ID or unambiguous prefix
    pub id: String,

    /// Why the issue is being closed
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Debug, Args)]
pub struct IdArg {
    /// Issue ID or unambiguous prefix
    pub id: String,
}

#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    #[arg(short = 's', long, value_parser = status_value)]
    pub status: Option<Status>,

    #[arg(short = 't', long = "type", value_parser = type_value)]
    pub issue_type: Option<IssueType>,

    #[arg(long, value_parser = priority_value)]
    pub priority_min: Option<u8>,

    #[arg(long, value_parser = priority_value)]
    pub priority_max: Option<u8>,

    /// Required labels (repeatable; all must match)
    #[arg(short = 'l', long = "label")]
    pub labels: Vec<String>,

    #[arg(long)]
    pub assignee: Option<String>,

    /// Only issues created in the last N days
    #[arg(long, value_name = "DAYS")]
    pub age: Option<i64>,

    #[arg(long)]
    pub offset: Option<usize>,

    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Substring to match in title or description
    pub query: String,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct ReadyArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Also show blocked issues with the reason each is not ready
    #[arg(long)]
    pub blocked: bool,
}

#[derive(Debug, Args)]
pub struct DepArgs {
    #[command(subcommand)]
    pub action: DepAction,
}

#[derive(Debug, Subcommand)]
pub enum DepAction {
    /// Add a dependency edge: FROM <type> TO
    Add {
        from: String,
        to: String,
        /// blocks, related, parent-child, discovered-from, or blocked-by
        /// (which swaps the direction)
        #[arg(short = 't', long = "type", default_value = "blocks")]
        dep_type: String,
    },
    /// Remove a dependency edge
    Remove {
        from: String,
        to: String,
        #[arg(short = 't', long = "type", default_value = "blocks")]
        dep_type: String,
    },
    /// Walk the dependency tree around an issue
    Tree {
        id: String,
        #[arg(long, default_value_t = beads_core::planner::DEFAULT_TREE_DEPTH)]
        depth: usize,
    },
}

#[derive(Debug, Args)]
pub struct LabelArgs {
    #[command(subcommand)]
    pub action: LabelAction,
}

#[derive(Debug, Subcommand)]
pub enum LabelAction {
    /// Add a label to an issue
    Add { id: String, label: String },
    /// Remove a label from an issue
    Remove { id: String, label: String },
    /// List every label in the store with usage counts
    ListAll,
}

#[derive(Debug, Args)]
pub struct CommentArgs {
    /// Issue ID or unambiguous prefix
    pub id: String,

    /// Comment text; omit to list existing comments
    pub text: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Journal file to import (defaults to the project journal)
    pub file: Option<PathBuf>,

    /// Remap colliding IDs instead of aborting
    #[arg(long)]
    pub resolve_collisions: bool,

    /// Fail on dangling dependency targets
    #[arg(long)]
    pub strict: bool,

    /// Classify and report without applying
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Destination file; "-" writes to stdout (defaults to the project
    /// journal)
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub action: DaemonAction,
}

#[derive(Debug, Subcommand)]
pub enum DaemonAction {
    /// Start the daemon for this database
    Start,
    /// Stop the running daemon
    Stop,
    /// Report whether a daemon is running
    Status,
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Print the mapping without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

fn priority_value(s: &str) -> Result<u8, String> {
    parse_priority(s).map_err(|e| e.to_string())
}

fn type_value(s: &str) -> Result<IssueType, String> {
    s.parse().map_err(|e: beads_core::Error| e.to_string())
}

fn status_value(s: &str) -> Result<Status, String> {
    s.parse().map_err(|e: beads_core::Error| e.to_string())
}

/// Parse a dependency type, normalising the `blocked-by` alias.
///
/// Returns the canonical type and whether the endpoints must swap: the
/// stored direction is always "A blocks B".
pub fn parse_dep_type_arg(s: &str) -> Result<(DepType, bool), beads_core::Error> {
    match s.to_lowercase().as_str() {
        "blocked-by" | "blocked_by" => Ok((DepType::Blocks, true)),
        other => other.parse().map(|t| (t, false)),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
