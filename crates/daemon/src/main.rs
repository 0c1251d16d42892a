// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! beadsd - the beads daemon.
//!
//! One daemon per database: it holds the single writable Store handle,
//! serves RPC on a Unix socket inside the `.beads` directory, watches the
//! journal for external edits, and flushes dirty state back to the
//! journal on a timer.
//!
//! Usage:
//!   beadsd --state-dir <path/to/.beads>

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use beads_core::paths::BeadsPaths;

mod flush;
mod git;
mod server;
mod watcher;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let paths = match parse_state_dir(&args) {
        Some(dir) => BeadsPaths::at(dir),
        None => match BeadsPaths::resolve(None) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = fs::create_dir_all(&paths.state_dir) {
        eprintln!("error: cannot create state dir: {e}");
        std::process::exit(1);
    }

    setup_logging(&paths.log_path());
    tracing::info!("beadsd starting, state_dir={}", paths.state_dir.display());

    // flock guarantees a single daemon per database; the lock file's
    // presence tells clients to route through RPC
    let lock_file = match acquire_lock(&paths.lock_path()) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("failed to acquire lock: {e}");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = fs::write(paths.pid_path(), std::process::id().to_string()) {
        tracing::error!("failed to write PID file: {e}");
        std::process::exit(1);
    }

    let result = server::run(&paths);

    // Cleanup
    let _ = fs::remove_file(paths.socket_path());
    let _ = fs::remove_file(paths.pid_path());
    drop(lock_file);
    let _ = fs::remove_file(paths.lock_path());

    match result {
        Ok(()) => tracing::info!("beadsd stopped"),
        Err(e) => {
            tracing::error!("daemon error: {e}");
            std::process::exit(4);
        }
    }
}

fn parse_state_dir(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if args[i] == "--state-dir" {
            if let Some(dir) = args.get(i + 1) {
                return Some(PathBuf::from(dir));
            }
        }
    }
    None
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Log to file; fall back to stderr when the file cannot be opened
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| std::io::Error::other("another beadsd instance is already running"))?;

    // Record the owning PID for stale-lock diagnostics
    let mut f = &file;
    let _ = writeln!(f, "{}", std::process::id());
    Ok(file)
}
