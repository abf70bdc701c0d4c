// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable local state for the spaced client.
//!
//! Four stores back the client:
//!
//! - `operations`: the full append-only history, replayed on startup to
//!   rebuild the projection
//! - `pending`: operations not yet acknowledged by the sync transport
//! - `review logs`: grading history, kept out of the projection replay
//! - a small key-value area for the client identity and the last applied
//!   remote sequence number
//!
//! The production implementation stores each log as JSONL (one JSON object
//! per line, fsynced on append) plus a JSON metadata file. An in-memory
//! implementation backs tests and ephemeral sessions.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Result;
use crate::op::Operation;

/// Storage seam for the client's durable state.
pub trait Persistence {
    /// Appends operations to the full history log.
    fn append_operations(&mut self, ops: &[Operation]) -> Result<()>;

    /// Reads the full history log in append order.
    fn load_operations(&self) -> Result<Vec<Operation>>;

    /// Appends operations to the pending (unacknowledged) queue.
    fn append_pending(&mut self, ops: &[Operation]) -> Result<()>;

    /// Reads the pending queue in append order without consuming it.
    fn load_pending(&self) -> Result<Vec<Operation>>;

    /// Removes the first `count` operations from the pending queue.
    ///
    /// Used after a successful push: only the operations that were actually
    /// sent are removed, so anything enqueued mid-flight stays queued.
    fn remove_pending(&mut self, count: usize) -> Result<()>;

    /// Appends operations to the review-log store.
    fn append_review_logs(&mut self, ops: &[Operation]) -> Result<()>;

    /// Reads the review-log store in append order.
    fn load_review_logs(&self) -> Result<Vec<Operation>>;

    /// Returns the client identity, if one has been established.
    fn client_id(&self) -> Result<Option<String>>;

    /// Stores the client identity.
    fn set_client_id(&mut self, id: &str) -> Result<()>;

    /// Returns the highest remote sequence number applied so far.
    fn last_applied_seq_no(&self) -> Result<u64>;

    /// Stores the highest remote sequence number applied so far.
    fn set_last_applied_seq_no(&mut self, seq_no: u64) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Meta {
    #[serde(rename = "clientId", skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(rename = "lastAppliedSeqNo", default)]
    last_applied_seq_no: u64,
}

/// JSONL-backed persistence rooted in a data directory.
pub struct JsonlStore {
    dir: PathBuf,
    meta: Meta,
}

const OPERATIONS_FILE: &str = "operations.jsonl";
const PENDING_FILE: &str = "pending.jsonl";
const REVIEW_LOGS_FILE: &str = "review-logs.jsonl";
const META_FILE: &str = "meta.json";

impl JsonlStore {
    /// Opens or creates a store in the given directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let meta_path = dir.join(META_FILE);
        let meta = if meta_path.exists() {
            serde_json::from_str(&fs::read_to_string(&meta_path)?)?
        } else {
            Meta::default()
        };

        Ok(JsonlStore { dir, meta })
    }

    /// Returns the directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_meta(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.meta)?;
        fs::write(self.dir.join(META_FILE), json)?;
        Ok(())
    }
}

/// Appends records to a JSONL file with fsync for durability.
fn jsonl_append<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for record in records {
        let json = serde_json::to_string(record)?;
        writeln!(file, "{json}")?;
    }
    file.sync_all()?;

    Ok(())
}

/// Reads all records from a JSONL file.
///
/// Skips empty lines and returns an empty vec if the file doesn't exist.
fn jsonl_read<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}

/// Rewrites a JSONL file with the given records, replacing its content.
fn jsonl_rewrite<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut file = File::create(path)?;
    for record in records {
        let json = serde_json::to_string(record)?;
        writeln!(file, "{json}")?;
    }
    file.sync_all()?;

    Ok(())
}

impl Persistence for JsonlStore {
    fn append_operations(&mut self, ops: &[Operation]) -> Result<()> {
        jsonl_append(&self.dir.join(OPERATIONS_FILE), ops)
    }

    fn load_operations(&self) -> Result<Vec<Operation>> {
        jsonl_read(&self.dir.join(OPERATIONS_FILE))
    }

    fn append_pending(&mut self, ops: &[Operation]) -> Result<()> {
        jsonl_append(&self.dir.join(PENDING_FILE), ops)
    }

    fn load_pending(&self) -> Result<Vec<Operation>> {
        jsonl_read(&self.dir.join(PENDING_FILE))
    }

    fn remove_pending(&mut self, count: usize) -> Result<()> {
        let path = self.dir.join(PENDING_FILE);
        let ops: Vec<Operation> = jsonl_read(&path)?;
        let remaining = if count >= ops.len() { &[][..] } else { &ops[count..] };
        jsonl_rewrite(&path, remaining)
    }

    fn append_review_logs(&mut self, ops: &[Operation]) -> Result<()> {
        jsonl_append(&self.dir.join(REVIEW_LOGS_FILE), ops)
    }

    fn load_review_logs(&self) -> Result<Vec<Operation>> {
        jsonl_read(&self.dir.join(REVIEW_LOGS_FILE))
    }

    fn client_id(&self) -> Result<Option<String>> {
        Ok(self.meta.client_id.clone())
    }

    fn set_client_id(&mut self, id: &str) -> Result<()> {
        self.meta.client_id = Some(id.to_string());
        self.write_meta()
    }

    fn last_applied_seq_no(&self) -> Result<u64> {
        Ok(self.meta.last_applied_seq_no)
    }

    fn set_last_applied_seq_no(&mut self, seq_no: u64) -> Result<()> {
        self.meta.last_applied_seq_no = seq_no;
        self.write_meta()
    }
}

/// In-memory persistence for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    operations: Vec<Operation>,
    pending: VecDeque<Operation>,
    review_logs: Vec<Operation>,
    client_id: Option<String>,
    last_applied_seq_no: u64,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn append_operations(&mut self, ops: &[Operation]) -> Result<()> {
        self.operations.extend_from_slice(ops);
        Ok(())
    }

    fn load_operations(&self) -> Result<Vec<Operation>> {
        Ok(self.operations.clone())
    }

    fn append_pending(&mut self, ops: &[Operation]) -> Result<()> {
        self.pending.extend(ops.iter().cloned());
        Ok(())
    }

    fn load_pending(&self) -> Result<Vec<Operation>> {
        Ok(self.pending.iter().cloned().collect())
    }

    fn remove_pending(&mut self, count: usize) -> Result<()> {
        for _ in 0..count.min(self.pending.len()) {
            self.pending.pop_front();
        }
        Ok(())
    }

    fn append_review_logs(&mut self, ops: &[Operation]) -> Result<()> {
        self.review_logs.extend_from_slice(ops);
        Ok(())
    }

    fn load_review_logs(&self) -> Result<Vec<Operation>> {
        Ok(self.review_logs.clone())
    }

    fn client_id(&self) -> Result<Option<String>> {
        Ok(self.client_id.clone())
    }

    fn set_client_id(&mut self, id: &str) -> Result<()> {
        self.client_id = Some(id.to_string());
        Ok(())
    }

    fn last_applied_seq_no(&self) -> Result<u64> {
        Ok(self.last_applied_seq_no)
    }

    fn set_last_applied_seq_no(&mut self, seq_no: u64) -> Result<()> {
        self.last_applied_seq_no = seq_no;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
