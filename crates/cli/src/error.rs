// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the spaced CLI.

use thiserror::Error;

/// All possible errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] spaced_core::Error),

    #[error("{0}")]
    Compiler(#[from] spaced_compiler::Error),

    #[error("no markdown files matched the provided inputs")]
    NoInputs,

    #[error("input must be a markdown file or glob, got directory: {0}")]
    DirectoryInput(String),

    #[error("all inputs must belong to the same vault; found {0} roots")]
    MultipleVaultRoots(usize),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(
        "no sync server configured\n  hint: pass --server <url> or set the SPACED_SERVER environment variable"
    )]
    NoServer,

    #[error("could not determine a data directory\n  hint: set SPACED_DATA_DIR")]
    NoDataDir,

    #[error("compilation failed due to {0}")]
    CompilationFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
