// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend routing: through the daemon when one is running, directly
//! against the store otherwise.
//!
//! A live daemon lock file means "route through RPC" - the daemon holds
//! the only writable store handle. Direct access opens the database in
//! process and is taken only when no daemon answers.

use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

use beads_core::db::Store;
use beads_core::import::{ImportOptions, ImportReport};
use beads_core::paths::BeadsPaths;
use beads_core::planner::{self, BlockedInfo, TreeNode};
use beads_core::{journal, Comment, DepType, Event, Issue, IssueFilter, NewIssue, Stats, UpdatePatch};
use beads_ipc::{framing, Request, Response};

use crate::error::{Error, Result};
use crate::lifecycle;

enum Backend {
    Daemon(PathBuf),
    Direct(Box<Store>),
}

/// A connection to the tracker: RPC or in-process.
pub struct Client {
    backend: Backend,
    paths: BeadsPaths,
}

impl Client {
    /// Route through the daemon if one answers, else open the store.
    pub fn connect(paths: &BeadsPaths) -> Result<Self> {
        let backend = if lifecycle::detect_daemon(paths)?.is_some() {
            Backend::Daemon(paths.socket_path())
        } else {
            Backend::Direct(Box::new(Store::open(&paths.db_path())?))
        };
        Ok(Client {
            backend,
            paths: paths.clone(),
        })
    }

    /// True when requests go over the socket.
    pub fn via_daemon(&self) -> bool {
        matches!(self.backend, Backend::Daemon(_))
    }

    fn call(socket: &PathBuf, request: &Request) -> Result<Response> {
        let mut stream =
            UnixStream::connect(socket).map_err(|e| Error::Daemon(format!("connect: {e}")))?;
        let _ = stream.set_read_timeout(Some(Duration::from_secs(30)));
        let _ = stream.set_write_timeout(Some(Duration::from_secs(30)));
        framing::write_request(&mut stream, request)?;
        Ok(framing::read_response(&mut stream)?)
    }

    // -- Issue operations ------------------------------------------------------

    pub fn create(&mut self, new: NewIssue, actor: &str) -> Result<Issue> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_issue(Self::call(
                socket,
                &Request::Create {
                    new: new.into(),
                    actor: actor.to_string(),
                },
            )?),
            Backend::Direct(store) => Ok(store.create_issue(&new, actor)?),
        }
    }

    pub fn get(&mut self, id: &str) -> Result<Issue> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                expect_issue(Self::call(socket, &Request::Get { id: id.to_string() })?)
            }
            Backend::Direct(store) => Ok(store.get_issue(id)?),
        }
    }

    pub fn update(&mut self, id: &str, patch: UpdatePatch, actor: &str) -> Result<Issue> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_issue(Self::call(
                socket,
                &Request::Update {
                    id: id.to_string(),
                    patch: patch.into(),
                    actor: actor.to_string(),
                },
            )?),
            Backend::Direct(store) => Ok(store.update_issue(id, &patch, actor)?),
        }
    }

    pub fn close(&mut self, id: &str, actor: &str, reason: Option<&str>) -> Result<Issue> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_issue(Self::call(
                socket,
                &Request::Close {
                    id: id.to_string(),
                    actor: actor.to_string(),
                    reason: reason.map(str::to_string),
                },
            )?),
            Backend::Direct(store) => Ok(store.close_issue(id, actor, reason)?),
        }
    }

    pub fn reopen(&mut self, id: &str, actor: &str) -> Result<Issue> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_issue(Self::call(
                socket,
                &Request::Reopen {
                    id: id.to_string(),
                    actor: actor.to_string(),
                },
            )?),
            Backend::Direct(store) => Ok(store.reopen_issue(id, actor)?),
        }
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                expect_ok(Self::call(socket, &Request::Delete { id: id.to_string() })?)
            }
            Backend::Direct(store) => Ok(store.delete_issue(id)?),
        }
    }

    pub fn list(&mut self, filter: IssueFilter) -> Result<Vec<Issue>> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_issues(Self::call(
                socket,
                &Request::List {
                    filter: filter.into(),
                },
            )?),
            Backend::Direct(store) => Ok(store.list_issues(&filter)?),
        }
    }

    pub fn search(&mut self, query: &str, filter: IssueFilter) -> Result<Vec<Issue>> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_issues(Self::call(
                socket,
                &Request::Search {
                    query: query.to_string(),
                    filter: filter.into(),
                },
            )?),
            Backend::Direct(store) => Ok(store.search_issues(query, &filter)?),
        }
    }

    pub fn ready(&mut self, filter: IssueFilter) -> Result<Vec<Issue>> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_issues(Self::call(
                socket,
                &Request::ReadyWork {
                    filter: filter.into(),
                },
            )?),
            Backend::Direct(store) => Ok(planner::ready_work(store, &filter)?),
        }
    }

    pub fn blocked(&mut self, filter: IssueFilter) -> Result<Vec<BlockedInfo>> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(
                    socket,
                    &Request::BlockedWork {
                        filter: filter.into(),
                    },
                )?;
                match response {
                    Response::Blocked(blocked) => Ok(blocked),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => Ok(planner::blocked_work(store, &filter)?),
        }
    }

    pub fn tree(&mut self, id: &str, max_depth: usize) -> Result<TreeNode> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(
                    socket,
                    &Request::DependencyTree {
                        id: id.to_string(),
                        max_depth,
                    },
                )?;
                match response {
                    Response::Tree(tree) => Ok(*tree),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => Ok(planner::dependency_tree(store, id, max_depth)?),
        }
    }

    // -- Dependencies, labels, comments ----------------------------------------

    pub fn add_dep(&mut self, from: &str, to: &str, dep_type: DepType, actor: &str) -> Result<()> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_ok(Self::call(
                socket,
                &Request::AddDependency {
                    from_id: from.to_string(),
                    to_id: to.to_string(),
                    dep_type,
                    actor: actor.to_string(),
                },
            )?),
            Backend::Direct(store) => Ok(store.add_dependency(from, to, dep_type, actor)?),
        }
    }

    pub fn remove_dep(
        &mut self,
        from: &str,
        to: &str,
        dep_type: DepType,
        actor: &str,
    ) -> Result<()> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_ok(Self::call(
                socket,
                &Request::RemoveDependency {
                    from_id: from.to_string(),
                    to_id: to.to_string(),
                    dep_type,
                    actor: actor.to_string(),
                },
            )?),
            Backend::Direct(store) => Ok(store.remove_dependency(from, to, dep_type, actor)?),
        }
    }

    pub fn add_label(&mut self, id: &str, label: &str, actor: &str) -> Result<()> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_ok(Self::call(
                socket,
                &Request::AddLabel {
                    id: id.to_string(),
                    label: label.to_string(),
                    actor: actor.to_string(),
                },
            )?),
            Backend::Direct(store) => Ok(store.add_label(id, label, actor)?),
        }
    }

    pub fn remove_label(&mut self, id: &str, label: &str, actor: &str) -> Result<()> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_ok(Self::call(
                socket,
                &Request::RemoveLabel {
                    id: id.to_string(),
                    label: label.to_string(),
                    actor: actor.to_string(),
                },
            )?),
            Backend::Direct(store) => {
                store.remove_label(id, label, actor)?;
                Ok(())
            }
        }
    }

    pub fn get_labels(&mut self, id: &str) -> Result<Vec<String>> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(socket, &Request::GetLabels { id: id.to_string() })?;
                match response {
                    Response::Labels(labels) => Ok(labels),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => Ok(store.get_labels(id)?),
        }
    }

    /// Every label in the store with its usage count.
    pub fn list_all_labels(&mut self) -> Result<Vec<(String, usize)>> {
        if let Backend::Direct(store) = &mut self.backend {
            return Ok(store.list_all_labels()?);
        }

        // No dedicated RPC method; tally through the issue list
        let issues = self.list(IssueFilter::default())?;
        let mut counts: std::collections::BTreeMap<String, usize> = Default::default();
        for issue in issues {
            for label in self.get_labels(&issue.id)? {
                *counts.entry(label).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    pub fn add_comment(&mut self, id: &str, author: &str, text: &str) -> Result<()> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_ok(Self::call(
                socket,
                &Request::AddComment {
                    id: id.to_string(),
                    author: author.to_string(),
                    text: text.to_string(),
                },
            )?),
            Backend::Direct(store) => {
                store.add_comment(id, author, text)?;
                Ok(())
            }
        }
    }

    pub fn get_comments(&mut self, id: &str) -> Result<Vec<Comment>> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(socket, &Request::GetComments { id: id.to_string() })?;
                match response {
                    Response::Comments(comments) => Ok(comments),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => Ok(store.get_comments(id)?),
        }
    }

    pub fn get_events(&mut self, id: &str) -> Result<Vec<Event>> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(socket, &Request::GetEvents { id: id.to_string() })?;
                match response {
                    Response::Events(events) => Ok(events),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => Ok(store.get_events(id)?),
        }
    }

    // -- Journal operations ----------------------------------------------------

    pub fn import_text(
        &mut self,
        text: &str,
        opts: ImportOptions,
        dry_run: bool,
        actor: &str,
    ) -> Result<ImportReport> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(
                    socket,
                    &Request::Import {
                        journal: text.to_string(),
                        resolve_collisions: opts.resolve_collisions,
                        strict: opts.strict,
                        dry_run,
                        actor: actor.to_string(),
                    },
                )?;
                match response {
                    Response::ImportReport(report) => Ok(*report),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => {
                let records = journal::decode(text)?;
                let report = if dry_run {
                    beads_core::import::dry_run(store, &records, &opts)?
                } else {
                    beads_core::import::apply(store, &records, &opts, actor)?
                };
                Ok(report)
            }
        }
    }

    pub fn export_text(&mut self) -> Result<String> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(socket, &Request::Export)?;
                match response {
                    Response::Journal(text) => Ok(text),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => {
                let records = journal::snapshot(store)?;
                Ok(journal::encode(&records)?)
            }
        }
    }

    /// Write the journal now and clear the dirty set.
    pub fn flush(&mut self) -> Result<()> {
        match &mut self.backend {
            Backend::Daemon(socket) => expect_ok(Self::call(socket, &Request::Flush)?),
            Backend::Direct(store) => {
                if store.dirty_count()? > 0 {
                    journal::export(store, &self.paths.journal_path())?;
                    store.drain_dirty()?;
                }
                Ok(())
            }
        }
    }

    // -- Identity --------------------------------------------------------------

    pub fn resolve_id(&mut self, input: &str) -> Result<String> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(
                    socket,
                    &Request::ResolveId {
                        input: input.to_string(),
                    },
                )?;
                match response {
                    Response::ResolvedId(id) => Ok(id),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => Ok(store.resolve_id(input)?),
        }
    }

    pub fn stats(&mut self) -> Result<Stats> {
        match &mut self.backend {
            Backend::Daemon(socket) => {
                let response = Self::call(socket, &Request::Stats)?;
                match response {
                    Response::Stats(stats) => Ok(stats),
                    other => Err(unexpected(other)),
                }
            }
            Backend::Direct(store) => Ok(store.stats()?),
        }
    }
}

fn expect_issue(response: Response) -> Result<Issue> {
    match response {
        Response::Issue(issue) => Ok(*issue),
        other => Err(unexpected(other)),
    }
}

fn expect_issues(response: Response) -> Result<Vec<Issue>> {
    match response {
        Response::Issues(issues) => Ok(issues),
        other => Err(unexpected(other)),
    }
}

fn expect_ok(response: Response) -> Result<()> {
    match response {
        Response::Ok => Ok(()),
        other => Err(unexpected(other)),
    }
}

fn unexpected(response: Response) -> Error {
    match response {
        Response::Error { code, message } => Error::Rpc { code, message },
        other => Error::Daemon(format!("unexpected response: {other:?}")),
    }
}
