// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bd - the beads issue tracker CLI.
//!
//! A thin layer over beads-core: argument parsing, daemon routing, and
//! plain-text or JSON output. The engine itself lives in the core crate.

pub mod cli;
pub mod client;
pub mod commands;
pub mod display;
pub mod error;
pub mod lifecycle;

pub use cli::Cli;
pub use error::{Error, Result};

use cli::Command;

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context::from_cli(&cli)?;

    match cli.command {
        Command::Init(args) => commands::init::run(&ctx, args),
        Command::Create(args) => commands::create::run(&ctx, args),
        Command::Show(args) => commands::show::run(&ctx, args),
        Command::Update(args) => commands::update::run(&ctx, args),
        Command::Close(args) => commands::close::run(&ctx, args),
        Command::Reopen(args) => commands::reopen::run(&ctx, args),
        Command::Delete(args) => commands::delete::run(&ctx, args),
        Command::List(args) => commands::list::run(&ctx, args),
        Command::Search(args) => commands::search::run(&ctx, args),
        Command::Ready(args) => commands::ready::run(&ctx, args),
        Command::Dep(args) => commands::dep::run(&ctx, args),
        Command::Label(args) => commands::label::run(&ctx, args),
        Command::Comment(args) => commands::comment::run(&ctx, args),
        Command::Import(args) => commands::import::run(&ctx, args),
        Command::Export(args) => commands::export::run(&ctx, args),
        Command::Stats => commands::stats::run(&ctx),
        Command::Daemon(args) => commands::daemon::run(&ctx, args),
        Command::MigrateHashIds(args) => commands::migrate::run(&ctx, args),
    }
}
