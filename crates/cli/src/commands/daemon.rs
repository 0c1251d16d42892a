// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::{DaemonAction, DaemonArgs};
use crate::error::Result;
use crate::lifecycle;

use super::Context;

pub fn run(ctx: &Context, args: DaemonArgs) -> Result<()> {
    let paths = ctx.paths()?;

    match args.action {
        DaemonAction::Start => {
            let info = lifecycle::spawn_daemon(paths)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "running": true, "pid": info.pid }));
            } else {
                println!("Daemon running (pid {})", info.pid);
            }
        }
        DaemonAction::Stop => {
            lifecycle::stop_daemon(paths)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "running": false }));
            } else {
                println!("Daemon stopped");
            }
        }
        DaemonAction::Status => match lifecycle::detect_daemon(paths)? {
            Some(info) => {
                if ctx.json {
                    println!("{}", serde_json::json!({ "running": true, "pid": info.pid }));
                } else {
                    println!("Daemon running (pid {})", info.pid);
                }
            }
            None => {
                if ctx.json {
                    println!("{}", serde_json::json!({ "running": false }));
                } else {
                    println!("Daemon not running");
                }
            }
        },
    }
    Ok(())
}
