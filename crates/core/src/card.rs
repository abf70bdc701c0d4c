// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core entity types for the spaced client.
//!
//! This module contains the projection entities: Card (with its scheduling
//! state and per-field-group merge timestamps), Deck, and ReviewLogEntry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::Timestamp;
use crate::error::{Error, Result};

/// Lifecycle state of a card within the scheduling algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    /// Never reviewed.
    New,
    /// In the initial learning steps.
    Learning,
    /// Graduated into the long-term review queue.
    Review,
    /// Lapsed and relearning.
    Relearning,
}

impl CardState {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardState::New => "New",
            CardState::Learning => "Learning",
            CardState::Review => "Review",
            CardState::Relearning => "Relearning",
        }
    }
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CardState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "New" => Ok(CardState::New),
            "Learning" => Ok(CardState::Learning),
            "Review" => Ok(CardState::Review),
            "Relearning" => Ok(CardState::Relearning),
            _ => Err(Error::InvalidCardState(s.to_string())),
        }
    }
}

/// Rating given to a card during review.
///
/// `Manual` marks scheduling changes not produced by an answer (e.g. a
/// reset); the other four are the user-facing answer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Manual,
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Manual => "Manual",
            Grade::Again => "Again",
            Grade::Hard => "Hard",
            Grade::Good => "Good",
            Grade::Easy => "Easy",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Manual" => Ok(Grade::Manual),
            "Again" => Ok(Grade::Again),
            "Hard" => Ok(Grade::Hard),
            "Good" => Ok(Grade::Good),
            "Easy" => Ok(Grade::Easy),
            _ => Err(Error::InvalidGrade(s.to_string())),
        }
    }
}

/// Scheduling state owned by the spaced-repetition algorithm.
///
/// The core treats these fields as opaque: they are produced by the
/// [`Scheduler`](crate::scheduler::Scheduler) collaborator and merged
/// atomically as one field group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduling {
    pub due: DateTime<Utc>,
    pub stability: f64,
    pub difficulty: f64,
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    pub reps: u32,
    pub lapses: u32,
    pub state: CardState,
    pub last_review: Option<DateTime<Utc>>,
}

impl Default for Scheduling {
    fn default() -> Self {
        Scheduling {
            due: DateTime::<Utc>::UNIX_EPOCH,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: CardState::New,
            last_review: None,
        }
    }
}

/// Last-modified timestamp per independently-mergeable field group.
///
/// A group's value is only overwritten by an operation whose timestamp is
/// strictly greater than the stored stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStamps {
    pub scheduling: Timestamp,
    pub content: Timestamp,
    pub deleted: Timestamp,
    pub bookmarked: Timestamp,
    pub suspended: Timestamp,
    pub metadata: Timestamp,
}

/// A flashcard as materialized by the projection.
///
/// Cards are created implicitly the first time any operation references an
/// unknown id (from [`Card::template`]) and are never physically removed;
/// deletion sets a flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Opaque unique identifier.
    pub id: String,
    /// Scheduling field group.
    pub scheduling: Scheduling,
    /// Question text (markdown).
    pub front: String,
    /// Answer text (markdown).
    pub back: String,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Bookmark flag.
    pub bookmarked: bool,
    /// Suspended until this instant; `None` means never suspended.
    pub suspended: Option<DateTime<Utc>>,
    /// Groups sibling cards generated from the same source note.
    pub note_id: Option<String>,
    /// Distinguishes variants within a note (e.g. "c1", "reverse").
    pub sibling_tag: Option<String>,
    /// Creation time (taken from the first operation that created the card).
    pub created_at: Timestamp,
    /// Per-field-group merge timestamps.
    pub stamps: FieldStamps,
}

impl Card {
    /// Returns the zero-value template used for implicit creation.
    pub fn template(id: impl Into<String>) -> Self {
        Card {
            id: id.into(),
            scheduling: Scheduling::default(),
            front: String::new(),
            back: String::new(),
            deleted: false,
            bookmarked: false,
            suspended: None,
            note_id: None,
            sibling_tag: None,
            created_at: 0,
            stamps: FieldStamps::default(),
        }
    }

    /// Returns true if the card is suspended at the given instant.
    pub fn is_suspended_at(&self, at: DateTime<Utc>) -> bool {
        self.suspended.is_some_and(|until| until > at)
    }
}

/// A named collection of cards.
///
/// Decks merge as a whole record: one last-modified timestamp covers
/// name, description, and the deleted flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deleted: bool,
    pub last_modified: Timestamp,
}

impl Deck {
    /// Returns the zero-value template used for implicit creation.
    pub fn template(id: impl Into<String>) -> Self {
        Deck {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            deleted: false,
            last_modified: 0,
        }
    }
}

/// One grading action, recorded for history and undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    pub id: String,
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
    /// Time spent answering, in milliseconds (clamped by the client).
    pub duration: u64,
    pub created_at: DateTime<Utc>,
}

/// Sibling-grouping metadata attached to cards produced from one source
/// note block (a reverse pair, or one card per cloze index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingMetadata {
    pub note_id: String,
    pub sibling_tag: String,
}

/// Suspension instant meaning "skip this card for ten minutes".
pub fn suspend_short(now: DateTime<Utc>) -> DateTime<Utc> {
    now + chrono::Duration::minutes(10)
}

/// Far-future sentinel meaning "bury this card indefinitely".
pub fn suspend_forever() -> DateTime<Utc> {
    DateTime::<Utc>::MAX_UTC
}

/// Suspension instant in the past, lifting any suspension.
pub fn unsuspended() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

#[cfg(test)]
#[path = "card_tests.rs"]
mod tests;
