// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod compile;
pub mod import;
pub mod init;
pub mod list;
pub mod sync;

use spaced_core::{Client, JsonlStore};

use crate::config;
use crate::error::Result;

/// Opens the collection client over the configured data directory.
///
/// Replays the full operation log, so the returned client's projection
/// reflects every prior local and synced mutation.
pub fn open_client() -> Result<Client<JsonlStore>> {
    let dir = config::data_dir()?;
    let store = JsonlStore::open(&dir)?;
    Ok(Client::open(store)?)
}
