// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: spawn, detect, stop.
//!
//! beadsd is spawned as a background process and communicates over a Unix
//! socket inside the `.beads` directory. Detection is a live Ping over
//! the socket; stale socket and pid files are cleaned up on the way.

use std::fs;
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use beads_core::paths::BeadsPaths;
use beads_ipc::{framing, Request, Response};

use crate::error::{Error, Result};

/// Information about a running daemon.
#[derive(Debug, Clone)]
pub struct DaemonInfo {
    /// Process ID of the daemon.
    pub pid: u32,
}

/// Detect if a daemon is running for this database.
///
/// Returns Some(DaemonInfo) if a daemon answers a Ping, None otherwise.
/// Cleans up stale pid/socket files when nothing answers.
pub fn detect_daemon(paths: &BeadsPaths) -> Result<Option<DaemonInfo>> {
    let socket_path = paths.socket_path();
    let pid_path = paths.pid_path();

    if !socket_path.exists() {
        if pid_path.exists() {
            let _ = fs::remove_file(&pid_path);
        }
        return Ok(None);
    }

    match UnixStream::connect(&socket_path) {
        Ok(mut stream) => {
            let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
            let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

            if framing::write_request(&mut stream, &Request::Ping).is_err() {
                cleanup_stale_files(paths);
                return Ok(None);
            }

            match framing::read_response(&mut stream) {
                Ok(Response::Pong) => match read_pid_file(&pid_path) {
                    Some(pid) if pid > 0 => Ok(Some(DaemonInfo { pid })),
                    _ => Ok(None), // pid file missing: daemon may be starting up
                },
                _ => {
                    cleanup_stale_files(paths);
                    Ok(None)
                }
            }
        }
        Err(_) => {
            cleanup_stale_files(paths);
            Ok(None)
        }
    }
}

/// Spawn a daemon for this database, unless one is already running.
pub fn spawn_daemon(paths: &BeadsPaths) -> Result<DaemonInfo> {
    if let Some(info) = detect_daemon(paths)? {
        return Ok(info);
    }

    fs::create_dir_all(&paths.state_dir)?;
    let beadsd = find_beadsd_binary();

    let mut child = Command::new(&beadsd)
        .arg("--state-dir")
        .arg(&paths.state_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Daemon(format!("failed to start beadsd ({}): {e}", beadsd.display())))?;

    // The daemon prints READY once the socket is bound
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) if line == "READY" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    // Confirm with short polling; surface stderr if the process died
    for _ in 0..150 {
        if let Ok(Some(status)) = child.try_wait() {
            let stderr_output = child
                .stderr
                .take()
                .map(|mut s| {
                    use std::io::Read;
                    let mut out = String::new();
                    let _ = s.read_to_string(&mut out);
                    out
                })
                .unwrap_or_default();
            return Err(Error::Daemon(format!(
                "daemon exited with {status}\n{}",
                stderr_output.trim()
            )));
        }

        if let Some(info) = detect_daemon(paths)? {
            return Ok(info);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    Err(Error::Daemon(
        "daemon failed to start: no response after spawn".to_string(),
    ))
}

/// Ask the daemon to shut down gracefully.
pub fn stop_daemon(paths: &BeadsPaths) -> Result<()> {
    let socket_path = paths.socket_path();
    if !socket_path.exists() {
        return Err(Error::Daemon("daemon is not running".into()));
    }

    let mut stream =
        UnixStream::connect(&socket_path).map_err(|e| Error::Daemon(format!("connect: {e}")))?;
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    framing::write_request(&mut stream, &Request::Shutdown)?;
    match framing::read_response(&mut stream)? {
        Response::ShuttingDown => {
            // Give it a moment to release the socket and lock
            for _ in 0..100 {
                if !paths.socket_path().exists() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Ok(())
        }
        Response::Error { message, .. } => Err(Error::Daemon(message)),
        _ => Err(Error::Daemon("unexpected response".into())),
    }
}

/// Find the beadsd binary: env override, then next to bd, then PATH.
fn find_beadsd_binary() -> PathBuf {
    if let Ok(path) = std::env::var("BEADS_DAEMON_BINARY") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        let beadsd = exe.with_file_name("beadsd");
        if beadsd.exists() {
            return beadsd;
        }
    }

    PathBuf::from("beadsd")
}

fn cleanup_stale_files(paths: &BeadsPaths) {
    let _ = fs::remove_file(paths.socket_path());
    let _ = fs::remove_file(paths.pid_path());
}

fn read_pid_file(pid_path: &std::path::Path) -> Option<u32> {
    fs::read_to_string(pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}
