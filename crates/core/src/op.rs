// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for offline-first mutation tracking.
//!
//! All mutations in spaced are represented as operations. Each op carries
//! the client wall-clock timestamp at creation and a payload describing the
//! mutation. Ops are designed to be:
//!
//! - Serializable: Can be stored and transmitted
//! - Idempotent: Replaying a log converges to the same projection
//! - Mergeable: Concurrent edits resolve per field group, last writer wins
//!
//! Operations are immutable once created; they are never edited, only
//! superseded by later operations on the same field group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{CardState, Grade, Scheduling};
use crate::clock::Timestamp;

/// An operation representing one atomic mutation intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    /// Replace a card's scheduling field group.
    Card { payload: CardPayload, timestamp: Timestamp },

    /// Replace a card's front/back text.
    CardContent { payload: CardContentPayload, timestamp: Timestamp },

    /// Set or clear a card's soft-delete flag.
    CardDeleted { payload: CardDeletedPayload, timestamp: Timestamp },

    /// Set or clear a card's bookmark flag.
    CardBookmarked { payload: CardBookmarkedPayload, timestamp: Timestamp },

    /// Suspend a card until an instant.
    CardSuspended { payload: CardSuspendedPayload, timestamp: Timestamp },

    /// Attach sibling-grouping metadata to a card.
    CardMetadata { payload: CardMetadataPayload, timestamp: Timestamp },

    /// Create or update a deck (whole-record merge).
    Deck { payload: DeckPayload, timestamp: Timestamp },

    /// Toggle deck membership via a monotonic counter.
    UpdateDeckCard { payload: UpdateDeckCardPayload, timestamp: Timestamp },

    /// Record a grading action.
    ReviewLog { payload: ReviewLogPayload, timestamp: Timestamp },

    /// Mark a review log entry as deleted (grade undo).
    ReviewLogDeleted { payload: ReviewLogDeletedPayload, timestamp: Timestamp },
}

/// Payload for [`Operation::Card`]: the full scheduling field group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPayload {
    pub id: String,
    #[serde(flatten)]
    pub scheduling: Scheduling,
}

/// Payload for [`Operation::CardContent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardContentPayload {
    #[serde(rename = "cardId")]
    pub card_id: String,
    pub front: String,
    pub back: String,
}

/// Payload for [`Operation::CardDeleted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDeletedPayload {
    #[serde(rename = "cardId")]
    pub card_id: String,
    pub deleted: bool,
}

/// Payload for [`Operation::CardBookmarked`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardBookmarkedPayload {
    #[serde(rename = "cardId")]
    pub card_id: String,
    pub bookmarked: bool,
}

/// Payload for [`Operation::CardSuspended`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSuspendedPayload {
    #[serde(rename = "cardId")]
    pub card_id: String,
    pub suspended: DateTime<Utc>,
}

/// Payload for [`Operation::CardMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMetadataPayload {
    #[serde(rename = "cardId")]
    pub card_id: String,
    #[serde(rename = "noteId")]
    pub note_id: String,
    #[serde(rename = "siblingTag")]
    pub sibling_tag: String,
}

/// Payload for [`Operation::Deck`]: the whole deck record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckPayload {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deleted: bool,
}

/// Payload for [`Operation::UpdateDeckCard`].
///
/// The counter's parity encodes membership (odd = member); operations only
/// ever increase it, so the merge rule is "highest counter wins".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDeckCardPayload {
    #[serde(rename = "deckId")]
    pub deck_id: String,
    #[serde(rename = "cardId")]
    pub card_id: String,
    #[serde(rename = "clCount")]
    pub count: u64,
}

/// Payload for [`Operation::ReviewLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLogPayload {
    pub id: String,
    #[serde(rename = "cardId")]
    pub card_id: String,
    pub grade: Grade,
    pub state: CardState,
    pub due: DateTime<Utc>,
    pub stability: f64,
    pub difficulty: f64,
    pub elapsed_days: u32,
    pub last_elapsed_days: u32,
    pub scheduled_days: u32,
    pub review: DateTime<Utc>,
    pub duration: u64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Payload for [`Operation::ReviewLogDeleted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLogDeletedPayload {
    #[serde(rename = "reviewLogId")]
    pub review_log_id: String,
    pub deleted: bool,
}

impl Operation {
    /// Returns the timestamp carried by this operation.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Operation::Card { timestamp, .. }
            | Operation::CardContent { timestamp, .. }
            | Operation::CardDeleted { timestamp, .. }
            | Operation::CardBookmarked { timestamp, .. }
            | Operation::CardSuspended { timestamp, .. }
            | Operation::CardMetadata { timestamp, .. }
            | Operation::Deck { timestamp, .. }
            | Operation::UpdateDeckCard { timestamp, .. }
            | Operation::ReviewLog { timestamp, .. }
            | Operation::ReviewLogDeleted { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the card ID affected by this operation, if any.
    pub fn card_id(&self) -> Option<&str> {
        match self {
            Operation::Card { payload, .. } => Some(&payload.id),
            Operation::CardContent { payload, .. } => Some(&payload.card_id),
            Operation::CardDeleted { payload, .. } => Some(&payload.card_id),
            Operation::CardBookmarked { payload, .. } => Some(&payload.card_id),
            Operation::CardSuspended { payload, .. } => Some(&payload.card_id),
            Operation::CardMetadata { payload, .. } => Some(&payload.card_id),
            Operation::UpdateDeckCard { payload, .. } => Some(&payload.card_id),
            Operation::ReviewLog { payload, .. } => Some(&payload.card_id),
            Operation::Deck { .. } | Operation::ReviewLogDeleted { .. } => None,
        }
    }

    /// Returns true for review-log operations, which are persisted to their
    /// own store and never projected.
    pub fn is_review_log(&self) -> bool {
        matches!(self, Operation::ReviewLog { .. } | Operation::ReviewLogDeleted { .. })
    }

    /// Creates a Card operation from a scheduling snapshot.
    pub fn card(id: String, scheduling: Scheduling, timestamp: Timestamp) -> Self {
        Operation::Card { payload: CardPayload { id, scheduling }, timestamp }
    }

    /// Creates a CardContent operation.
    pub fn card_content(card_id: String, front: String, back: String, timestamp: Timestamp) -> Self {
        Operation::CardContent {
            payload: CardContentPayload { card_id, front, back },
            timestamp,
        }
    }

    /// Creates a CardDeleted operation.
    pub fn card_deleted(card_id: String, deleted: bool, timestamp: Timestamp) -> Self {
        Operation::CardDeleted { payload: CardDeletedPayload { card_id, deleted }, timestamp }
    }

    /// Creates a CardBookmarked operation.
    pub fn card_bookmarked(card_id: String, bookmarked: bool, timestamp: Timestamp) -> Self {
        Operation::CardBookmarked {
            payload: CardBookmarkedPayload { card_id, bookmarked },
            timestamp,
        }
    }

    /// Creates a CardSuspended operation.
    pub fn card_suspended(card_id: String, suspended: DateTime<Utc>, timestamp: Timestamp) -> Self {
        Operation::CardSuspended {
            payload: CardSuspendedPayload { card_id, suspended },
            timestamp,
        }
    }

    /// Creates a CardMetadata operation.
    pub fn card_metadata(
        card_id: String,
        note_id: String,
        sibling_tag: String,
        timestamp: Timestamp,
    ) -> Self {
        Operation::CardMetadata {
            payload: CardMetadataPayload { card_id, note_id, sibling_tag },
            timestamp,
        }
    }

    /// Creates a Deck operation.
    pub fn deck(
        id: String,
        name: String,
        description: String,
        deleted: bool,
        timestamp: Timestamp,
    ) -> Self {
        Operation::Deck { payload: DeckPayload { id, name, description, deleted }, timestamp }
    }

    /// Creates an UpdateDeckCard operation.
    pub fn update_deck_card(
        deck_id: String,
        card_id: String,
        count: u64,
        timestamp: Timestamp,
    ) -> Self {
        Operation::UpdateDeckCard {
            payload: UpdateDeckCardPayload { deck_id, card_id, count },
            timestamp,
        }
    }

    /// Creates a ReviewLog operation from a log entry.
    pub fn review_log(entry: &crate::card::ReviewLogEntry, timestamp: Timestamp) -> Self {
        Operation::ReviewLog {
            payload: ReviewLogPayload {
                id: entry.id.clone(),
                card_id: entry.card_id.clone(),
                grade: entry.grade,
                state: entry.state,
                due: entry.due,
                stability: entry.stability,
                difficulty: entry.difficulty,
                elapsed_days: entry.elapsed_days,
                last_elapsed_days: entry.last_elapsed_days,
                scheduled_days: entry.scheduled_days,
                review: entry.review,
                duration: entry.duration,
                created_at: entry.created_at,
            },
            timestamp,
        }
    }

    /// Creates a ReviewLogDeleted operation.
    pub fn review_log_deleted(review_log_id: String, deleted: bool, timestamp: Timestamp) -> Self {
        Operation::ReviewLogDeleted {
            payload: ReviewLogDeletedPayload { review_log_id, deleted },
            timestamp,
        }
    }
}

/// An operation as delivered by the remote side, carrying the
/// server-assigned sequence number.
///
/// Sequence numbers are strictly increasing and assigned only by the
/// remote; the client never mints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedOperation {
    #[serde(rename = "seqNo")]
    pub seq_no: u64,
    #[serde(flatten)]
    pub op: Operation,
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
