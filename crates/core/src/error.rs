// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for spaced-core operations.

use thiserror::Error;

/// All possible errors that can occur in spaced-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("deck not found: {0}")]
    DeckNotFound(String),

    #[error("invalid card state: '{0}'\n  hint: valid states are: New, Learning, Review, Relearning")]
    InvalidCardState(String),

    #[error("invalid grade: '{0}'\n  hint: valid grades are: Manual, Again, Hard, Good, Easy")]
    InvalidGrade(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// A specialized Result type for spaced-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
