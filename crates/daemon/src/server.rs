// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon main loop: accept RPC connections, watch the journal, and
//! schedule flushes.
//!
//! The loop owns the single Store handle. Connections are served one
//! request at a time (one frame in flight per connection); writes are
//! therefore serialised in arrival order, which is the order the event
//! log records.

use std::io::Write as _;
use std::time::Duration;

use tokio::net::{UnixListener, UnixStream};
use tokio::time::Instant;

use beads_core::db::Store;
use beads_core::import::{self, ImportOptions};
use beads_core::paths::BeadsPaths;
use beads_core::{journal, planner};
use beads_ipc::{framing_async, Request, Response};

use crate::flush;
use crate::git::GitBridge;
use crate::watcher;

/// Coalescing delay between the first dirty mark and the journal write.
const FLUSH_DELAY: Duration = Duration::from_millis(500);

/// Time allowed for reading, serving, and answering one framed request.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the daemon until shutdown is requested.
pub fn run(paths: &BeadsPaths) -> std::io::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(paths))
}

async fn run_async(paths: &BeadsPaths) -> std::io::Result<()> {
    let mut store =
        Store::open(&paths.db_path()).map_err(|e| std::io::Error::other(e.to_string()))?;

    let socket_path = paths.socket_path();
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;

    tracing::info!("listening on {}", socket_path.display());

    // Signal readiness to the spawning CLI
    println!("READY");
    let _ = std::io::stdout().flush();

    let git = GitBridge::detect(&store, &paths.journal_path());
    let mut watcher = watcher::spawn(
        paths.journal_path(),
        watcher::DEBOUNCE,
        watcher::POLL_INTERVAL,
    );
    tracing::info!("journal watcher mode: {:?}", watcher.mode);

    let mut flush_at: Option<Instant> = None;
    let mut shutdown = false;

    while !shutdown {
        let deadline = flush_at.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        // A stalled client must not wedge the loop
                        let served = tokio::time::timeout(
                            CONNECTION_TIMEOUT,
                            handle_connection(stream, &mut store, paths),
                        )
                        .await;
                        match served {
                            Ok(Ok(req_shutdown)) => shutdown = req_shutdown,
                            Ok(Err(e)) => tracing::warn!("connection error: {e}"),
                            Err(_) => tracing::warn!("connection timed out"),
                        }
                        if needs_flush(&store) && flush_at.is_none() {
                            flush_at = Some(Instant::now() + FLUSH_DELAY);
                        }
                    }
                    Err(e) => tracing::warn!("accept failed: {e}"),
                }
            }

            Some(()) = watcher.rx.recv() => {
                reconcile(&mut store, paths);
                if needs_flush(&store) && flush_at.is_none() {
                    flush_at = Some(Instant::now() + FLUSH_DELAY);
                }
            }

            _ = tokio::time::sleep_until(deadline), if flush_at.is_some() => {
                flush_at = None;
                if let Err(e) = flush::flush(&mut store, paths, &git) {
                    tracing::error!("flush failed: {e}");
                }
            }
        }
    }

    // Final flush so shutdown never strands dirty state
    if let Err(e) = flush::flush(&mut store, paths, &git) {
        tracing::error!("final flush failed: {e}");
    }

    Ok(())
}

fn needs_flush(store: &Store) -> bool {
    store.dirty_count().map(|n| n > 0).unwrap_or(false)
}

/// Serve one framed request on the connection. Returns true when the
/// request asked for shutdown.
async fn handle_connection(
    mut stream: UnixStream,
    store: &mut Store,
    paths: &BeadsPaths,
) -> std::io::Result<bool> {
    let request = framing_async::read_request(&mut stream).await?;
    let shutdown = matches!(request, Request::Shutdown);
    let response = dispatch(request, store, paths);
    framing_async::write_response(&mut stream, &response).await?;
    Ok(shutdown)
}

/// Reconcile the journal after an external change.
///
/// Local changes win: with a non-empty dirty set the journal is rewritten
/// from the store and the external edit discarded. From a clean state the
/// journal is imported (dry-run first, then apply).
fn reconcile(store: &mut Store, paths: &BeadsPaths) {
    let journal_path = paths.journal_path();

    match store.dirty_count() {
        Ok(n) if n > 0 => {
            tracing::info!("journal changed externally but {n} issues are dirty; local wins");
            if let Err(e) = journal::export(store, &journal_path) {
                tracing::error!("journal rewrite failed: {e}");
                return;
            }
            if let Err(e) = store.drain_dirty() {
                tracing::error!("dirty drain failed: {e}");
            }
        }
        Ok(_) => {
            let records = match journal::read_file(&journal_path) {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!("journal parse failed, not importing: {e}");
                    return;
                }
            };
            let opts = ImportOptions::default();
            match import::dry_run(store, &records, &opts) {
                Ok(report) if report.new_count() == 0 && report.collisions.is_empty() => {
                    tracing::debug!("journal change was idempotent");
                }
                Ok(_) => match import::apply(store, &records, &opts, "journal") {
                    Ok(report) => tracing::info!(
                        "imported journal: {} new, {} idempotent, {} dangling",
                        report.new_count(),
                        report.idempotent,
                        report.dangling.len()
                    ),
                    Err(e) => tracing::error!("journal import failed: {e}"),
                },
                Err(e) => tracing::error!("journal dry-run failed: {e}"),
            }
        }
        Err(e) => tracing::error!("dirty count failed: {e}"),
    }
}

/// Execute one request against the store.
fn dispatch(request: Request, store: &mut Store, paths: &BeadsPaths) -> Response {
    match request {
        Request::Create { new, actor } => store
            .create_issue(&new.into(), &actor)
            .map(|i| Response::Issue(Box::new(i)))
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Get { id } => store
            .get_issue(&id)
            .map(|i| Response::Issue(Box::new(i)))
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Update { id, patch, actor } => store
            .update_issue(&id, &patch.into(), &actor)
            .map(|i| Response::Issue(Box::new(i)))
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Close { id, actor, reason } => store
            .close_issue(&id, &actor, reason.as_deref())
            .map(|i| Response::Issue(Box::new(i)))
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Reopen { id, actor } => store
            .reopen_issue(&id, &actor)
            .map(|i| Response::Issue(Box::new(i)))
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Delete { id } => store
            .delete_issue(&id)
            .map(|()| Response::Ok)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::List { filter } => store
            .list_issues(&filter.into())
            .map(Response::Issues)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Search { query, filter } => store
            .search_issues(&query, &filter.into())
            .map(Response::Issues)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::ReadyWork { filter } => planner::ready_work(store, &filter.into())
            .map(Response::Issues)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::BlockedWork { filter } => planner::blocked_work(store, &filter.into())
            .map(Response::Blocked)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::DependencyTree { id, max_depth } => planner::dependency_tree(store, &id, max_depth)
            .map(|t| Response::Tree(Box::new(t)))
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::AddDependency {
            from_id,
            to_id,
            dep_type,
            actor,
        } => store
            .add_dependency(&from_id, &to_id, dep_type, &actor)
            .map(|()| Response::Ok)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::RemoveDependency {
            from_id,
            to_id,
            dep_type,
            actor,
        } => store
            .remove_dependency(&from_id, &to_id, dep_type, &actor)
            .map(|()| Response::Ok)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::AddLabel { id, label, actor } => store
            .add_label(&id, &label, &actor)
            .map(|()| Response::Ok)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::RemoveLabel { id, label, actor } => store
            .remove_label(&id, &label, &actor)
            .map(|_| Response::Ok)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::AddComment { id, author, text } => store
            .add_comment(&id, &author, &text)
            .map(|_| Response::Ok)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::GetComments { id } => store
            .get_comments(&id)
            .map(Response::Comments)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::GetEvents { id } => store
            .get_events(&id)
            .map(Response::Events)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::GetLabels { id } => store
            .get_labels(&id)
            .map(Response::Labels)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Import {
            journal: text,
            resolve_collisions,
            strict,
            dry_run,
            actor,
        } => {
            let opts = ImportOptions {
                resolve_collisions,
                strict,
            };
            let result = journal::decode(&text).and_then(|records| {
                if dry_run {
                    import::dry_run(store, &records, &opts)
                } else {
                    import::apply(store, &records, &opts, &actor)
                }
            });
            result
                .map(|r| Response::ImportReport(Box::new(r)))
                .unwrap_or_else(|e| Response::from_error(&e))
        }

        Request::Export => journal::snapshot(store)
            .and_then(|records| journal::encode(&records))
            .map(Response::Journal)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::ResolveId { input } => store
            .resolve_id(&input)
            .map(Response::ResolvedId)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Stats => store
            .stats()
            .map(Response::Stats)
            .unwrap_or_else(|e| Response::from_error(&e)),

        Request::Flush => {
            let git = GitBridge::detect(store, &paths.journal_path());
            flush::flush(store, paths, &git)
                .map(|()| Response::Ok)
                .unwrap_or_else(|e| Response::from_error(&e))
        }

        Request::Ping => Response::Pong,
        Request::Shutdown => Response::ShuttingDown,
        Request::Hello { .. } => Response::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
