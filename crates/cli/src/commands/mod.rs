// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One module per subcommand; each is a thin wrapper over the client.

pub mod close;
pub mod comment;
pub mod create;
pub mod daemon;
pub mod delete;
pub mod dep;
pub mod export;
pub mod import;
pub mod init;
pub mod label;
pub mod list;
pub mod migrate;
pub mod ready;
pub mod reopen;
pub mod search;
pub mod show;
pub mod stats;
pub mod update;

use chrono::{Duration, Utc};

use beads_core::paths::BeadsPaths;
use beads_core::IssueFilter;

use crate::cli::{Cli, FilterArgs};
use crate::client::Client;
use crate::error::Result;

/// Shared command context: resolved paths, output mode, and actor.
pub struct Context {
    pub paths_result: std::result::Result<BeadsPaths, beads_core::Error>,
    pub json: bool,
    pub actor: String,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        // Resolution errors are deferred: `bd init` must run without an
        // existing state directory
        let paths_result = BeadsPaths::resolve(cli.db.as_deref());
        let actor = cli
            .actor
            .clone()
            .unwrap_or_else(beads_core::actor::current_actor);
        Ok(Context {
            paths_result,
            json: cli.json,
            actor,
        })
    }

    /// The resolved paths, or the deferred discovery error.
    pub fn paths(&self) -> Result<&BeadsPaths> {
        match &self.paths_result {
            Ok(paths) => Ok(paths),
            Err(e) => Err(crate::error::Error::Usage(e.to_string())),
        }
    }

    /// Connect to the daemon or open the store directly.
    pub fn client(&self) -> Result<Client> {
        Client::connect(self.paths()?)
    }
}

/// Convert filter arguments into a core filter.
pub fn to_filter(args: &FilterArgs) -> IssueFilter {
    IssueFilter {
        status: args.status,
        issue_type: args.issue_type,
        priority_min: args.priority_min,
        priority_max: args.priority_max,
        labels: args.labels.clone(),
        assignee: args.assignee.clone(),
        created_after: args.age.map(|days| Utc::now() - Duration::days(days)),
        created_before: None,
        offset: args.offset,
        limit: args.limit,
    }
}
