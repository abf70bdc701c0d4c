// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Data directory resolution.
//!
//! The collection lives in one directory of JSONL stores plus a media
//! folder for extracted bundle assets. `SPACED_DATA_DIR` overrides the
//! platform default for tests and portable setups.

use std::path::PathBuf;

use crate::error::{Error, Result};

const DATA_DIR_ENV: &str = "SPACED_DATA_DIR";
const APP_DIR_NAME: &str = "spaced";

/// Name of the directory holding extracted bundle assets.
pub const MEDIA_DIR_NAME: &str = "media";

/// Returns the collection's data directory.
///
/// `SPACED_DATA_DIR` wins; otherwise the platform data directory plus
/// an application folder.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)).ok_or(Error::NoDataDir)
}

/// Returns the media directory under the data directory.
pub fn media_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join(MEDIA_DIR_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
