// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spaced")]
#[command(about = "An offline-first flashcard collection with vault compilation and sync")]
#[command(
    long_about = "An offline-first flashcard collection.\n\n\
    Compile markup notes from a vault into portable bundles, import them\n\
    into a local collection, and sync the operation log with a remote."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize the local collection and client identity
    Init,

    /// Compile vault markup files into a bundle
    #[command(after_help = "Examples:\n  \
        spaced compile notes/deck.md             Compile one file\n  \
        spaced compile 'notes/**/*.md'           Compile a glob of files\n  \
        spaced compile notes/*.md --out deck.zip Write to a fixed path\n  \
        spaced compile notes/*.md --strict       Treat warnings as failures")]
    Compile {
        /// Markdown files or glob patterns (must share one vault)
        inputs: Vec<String>,

        /// Output path (default: timestamped filename in the working directory)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Treat warnings as build failures
        #[arg(long)]
        strict: bool,
    },

    /// Import a compiled bundle into the local collection
    Import {
        /// Path to a bundle file
        bundle: PathBuf,

        /// Skip cards whose content fingerprint already exists
        #[arg(long)]
        skip_duplicates: bool,
    },

    /// List cards in the local collection
    List {
        /// List decks instead of cards
        #[arg(long)]
        decks: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Push pending operations and pull remote operations once
    Sync {
        /// Sync server base URL (default: SPACED_SERVER environment variable)
        #[arg(long)]
        server: Option<String>,

        /// Only push pending local operations
        #[arg(long)]
        push_only: bool,

        /// Only pull remote operations
        #[arg(long)]
        pull_only: bool,

        /// Keep syncing on a fixed interval instead of one cycle
        #[arg(long)]
        watch: bool,
    },
}
