// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! spaced-core: Offline-first flashcard sync core
//!
//! This crate provides the operation model, the in-memory projection with
//! field-scoped last-writer-wins merging, durable operation stores, the
//! client mutation entry points, and the push/pull sync engine used by the
//! spaced CLI and importer.

pub mod card;
pub mod client;
pub mod clock;
pub mod error;
pub mod op;
pub mod projection;
pub mod scheduler;
pub mod store;
pub mod sync;

pub use card::{Card, CardState, Deck, Grade, ReviewLogEntry, Scheduling, SiblingMetadata};
pub use client::{Client, MAX_REVIEW_DURATION_MS};
pub use clock::{Clock, MonotonicClock, SystemClock, Timestamp};
pub use error::{Error, Result};
pub use op::{Operation, SequencedOperation};
pub use projection::{Projection, SubscriptionId, UndoGrade};
pub use scheduler::Scheduler;
pub use store::{JsonlStore, MemoryStore, Persistence};
pub use sync::{PushAck, SyncEngine, SyncOutcome, Transport};
