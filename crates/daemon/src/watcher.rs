// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Journal file watcher with debouncing.
//!
//! Native mode registers an OS watcher (inotify on Linux, FSEvents/kqueue
//! on macOS, ReadDirectoryChangesW on Windows) on the journal's parent
//! directory, so atomic-rename replacement by editors is seen. When
//! registration fails (containers, network filesystems) the watcher falls
//! back to polling mtime and size at a fixed interval.
//!
//! Raw events are debounced: a change starts a timer, further events
//! within the window reset it, and a single reconcile signal fires when
//! the window expires.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;

/// Quiet window before a burst of changes collapses into one signal.
pub const DEBOUNCE: Duration = Duration::from_millis(100);
/// Polling cadence in fallback mode.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Which change-detection backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Native,
    Polling,
}

/// A running watcher. Dropping it stops the native backend; the debounce
/// and polling tasks stop when their channels close.
pub struct JournalWatcher {
    /// Emits one `()` per debounced batch of changes.
    pub rx: mpsc::Receiver<()>,
    pub mode: WatchMode,
    _native: Option<RecommendedWatcher>,
}

/// Start watching the journal at `path`.
pub fn spawn(path: PathBuf, debounce: Duration, poll_interval: Duration) -> JournalWatcher {
    let (raw_tx, raw_rx) = mpsc::channel::<()>(64);
    let (out_tx, out_rx) = mpsc::channel::<()>(8);

    tokio::spawn(debounce_task(raw_rx, out_tx, debounce));

    match native_watcher(&path, raw_tx.clone()) {
        Ok(native) => JournalWatcher {
            rx: out_rx,
            mode: WatchMode::Native,
            _native: Some(native),
        },
        Err(e) => {
            tracing::warn!("native watch failed ({e}), falling back to polling");
            tokio::spawn(poll_task(path, raw_tx, poll_interval));
            JournalWatcher {
                rx: out_rx,
                mode: WatchMode::Polling,
                _native: None,
            }
        }
    }
}

/// Register the OS watcher on the journal's parent directory and filter
/// events down to the journal file itself.
fn native_watcher(path: &Path, raw_tx: mpsc::Sender<()>) -> notify::Result<RecommendedWatcher> {
    let parent = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path.file_name().map(|n| n.to_os_string());

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            let Ok(event) = res else { return };
            if !is_relevant(&event) {
                return;
            }
            // Only the journal itself matters; renames land with the
            // journal as the destination path
            let touches_journal = event.paths.is_empty()
                || event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if touches_journal {
                let _ = raw_tx.blocking_send(());
            }
        },
        notify::Config::default(),
    )?;

    watcher.watch(&parent, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Truncation, append, permission change, removal, and rename replacement
/// must all count as changes.
fn is_relevant(event: &notify::Event) -> bool {
    matches!(
        event.kind,
        notify::EventKind::Create(_)
            | notify::EventKind::Modify(_)
            | notify::EventKind::Remove(_)
            | notify::EventKind::Any
    )
}

/// Collapse bursts: emit once per quiet window.
async fn debounce_task(
    mut raw_rx: mpsc::Receiver<()>,
    out_tx: mpsc::Sender<()>,
    window: Duration,
) {
    while raw_rx.recv().await.is_some() {
        // A change arrived; wait for the burst to settle
        loop {
            tokio::select! {
                more = raw_rx.recv() => {
                    if more.is_none() {
                        return;
                    }
                    // timer resets on each further event
                }
                _ = tokio::time::sleep(window) => break,
            }
        }
        if out_tx.send(()).await.is_err() {
            return;
        }
    }
}

/// Fallback: compare modification time and size at a fixed interval.
async fn poll_task(path: PathBuf, raw_tx: mpsc::Sender<()>, interval: Duration) {
    let mut last = stat(&path);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let current = stat(&path);
        if current != last {
            last = current;
            if raw_tx.send(()).await.is_err() {
                return;
            }
        }
    }
}

/// (mtime, size) of the journal; None while it does not exist.
fn stat(path: &Path) -> Option<(std::time::SystemTime, u64)> {
    let meta = std::fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
