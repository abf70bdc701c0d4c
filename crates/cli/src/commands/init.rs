// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use uuid::Uuid;

use crate::config;
use crate::error::Result;

pub fn run() -> Result<()> {
    let dir = config::data_dir()?;
    let mut client = super::open_client()?;

    match client.client_id()? {
        Some(id) => {
            println!("Collection already initialized at {} (client {})", dir.display(), id);
        }
        None => {
            let id = Uuid::new_v4().to_string();
            client.set_client_id(&id)?;
            println!("Initialized collection at {} (client {})", dir.display(), id);
        }
    }

    Ok(())
}
