// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! spacedrs - The spaced CLI library.
//!
//! This crate wires the compiler and the sync core into a command-line
//! tool: compile vault notes into bundles, import bundles into the local
//! collection, list the collection, and run one-shot sync cycles.
//!
//! # Main Components
//!
//! - [`Cli`] / [`Command`] - clap surface
//! - [`config`] - data directory resolution
//! - [`transport::HttpTransport`] - blocking HTTP sync transport
//! - one command module per subcommand, dispatched through [`run`]

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod transport;

pub use cli::{Cli, Command};
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init => commands::init::run(),
        Command::Compile { inputs, out, strict } => {
            commands::compile::run(&inputs, out.as_deref(), strict)
        }
        Command::Import { bundle, skip_duplicates } => {
            commands::import::run(&bundle, skip_duplicates)
        }
        Command::List { decks, json } => commands::list::run(decks, json),
        Command::Sync { server, push_only, pull_only, watch } => {
            commands::sync::run(server, push_only, pull_only, watch)
        }
    }
}
