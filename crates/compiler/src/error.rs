// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for spaced-compiler operations.
//!
//! These are the fatal, fail-closed conditions: archive corruption, schema
//! mismatches, missing manifest entries. Parse problems in markup sources
//! are not errors; they accumulate as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use thiserror::Error;

/// All possible errors that can occur in spaced-compiler operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid zip file: {0}")]
    InvalidArchive(String),

    #[error("unsupported zip compression method (only store is supported)")]
    UnsupportedCompression,

    #[error("invalid bundle: manifest.json not found")]
    MissingManifest,

    #[error("invalid bundle: {0}")]
    InvalidManifest(String),

    #[error("bundle asset missing: {0}")]
    MissingAsset(String),

    #[error("no replacement URL found for placeholder {0}")]
    MissingReplacement(String),

    #[error("compilation failed due to {errors} error diagnostic(s)")]
    CompilationFailed { errors: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

/// A specialized Result type for spaced-compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
