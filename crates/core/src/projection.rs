// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory projection of the operation log.
//!
//! The projection is the materialized view rebuilt by replaying operations.
//! Merge rules:
//!
//! - Card field groups (scheduling, content, deleted, bookmarked, suspended,
//!   metadata): last wall-clock timestamp wins, independently per group
//! - Deck: last timestamp wins for the whole record
//! - Deck membership: highest counter wins; the counter's parity encodes
//!   membership (odd = member)
//! - ReviewLog/ReviewLogDeleted: never projected, always `applied = false`
//!
//! Applying a stale operation is a normal, silent outcome, not an error.
//! All apply paths are idempotent, so at-least-once delivery is safe.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::card::{Card, Deck};
use crate::op::Operation;

/// Snapshot of a card taken before grading, for one level of undo.
///
/// The undo stack is process-local and lost on restart; it is not part of
/// the merge model.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoGrade {
    /// The card as it was before the grade was applied.
    pub card: Card,
    pub card_id: String,
    pub review_log_id: String,
}

/// Handle returned by [`Projection::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Caches {
    version: u64,
    active_cards: Option<Arc<Vec<Card>>>,
    active_decks: Option<Arc<Vec<Deck>>>,
}

/// The in-memory materialized view of cards, decks, and deck membership.
///
/// The projection is exclusively owned: all mutation flows through
/// [`apply`](Projection::apply), and readers observe it only through the
/// snapshot accessors. Consumers must treat returned snapshots as
/// immutable; any change must be expressed as a new [`Operation`].
pub struct Projection {
    cards: HashMap<String, Card>,
    decks: HashMap<String, Deck>,
    /// deck id -> card id -> membership counter.
    deck_cards: HashMap<String, HashMap<String, u64>>,
    /// note id -> card ids sharing it (sibling index).
    note_index: HashMap<String, Vec<String>>,
    undo_stack: Vec<UndoGrade>,
    /// Bumped on every successful apply; invalidates the snapshot caches.
    version: u64,
    caches: Mutex<Caches>,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_subscription: AtomicU64,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection {
    /// Creates an empty projection.
    pub fn new() -> Self {
        Projection {
            cards: HashMap::new(),
            decks: HashMap::new(),
            deck_cards: HashMap::new(),
            note_index: HashMap::new(),
            undo_stack: Vec::new(),
            version: 0,
            caches: Mutex::new(Caches::default()),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Applies an operation to the projection.
    ///
    /// Returns true if the operation was applied, false if it was stale
    /// (an older-or-equal write to the targeted field group) or is a
    /// review-log operation, which is never projected.
    pub fn apply(&mut self, op: &Operation) -> bool {
        let applied = match op {
            Operation::Card { payload, timestamp } => {
                self.with_card(&payload.id, *timestamp, |card| {
                    if *timestamp <= card.stamps.scheduling {
                        return false;
                    }
                    card.scheduling = payload.scheduling.clone();
                    card.stamps.scheduling = *timestamp;
                    true
                })
            }
            Operation::CardContent { payload, timestamp } => {
                self.with_card(&payload.card_id, *timestamp, |card| {
                    if *timestamp <= card.stamps.content {
                        return false;
                    }
                    card.front = payload.front.clone();
                    card.back = payload.back.clone();
                    card.stamps.content = *timestamp;
                    true
                })
            }
            Operation::CardDeleted { payload, timestamp } => {
                self.with_card(&payload.card_id, *timestamp, |card| {
                    if *timestamp <= card.stamps.deleted {
                        return false;
                    }
                    card.deleted = payload.deleted;
                    card.stamps.deleted = *timestamp;
                    true
                })
            }
            Operation::CardBookmarked { payload, timestamp } => {
                self.with_card(&payload.card_id, *timestamp, |card| {
                    if *timestamp <= card.stamps.bookmarked {
                        return false;
                    }
                    card.bookmarked = payload.bookmarked;
                    card.stamps.bookmarked = *timestamp;
                    true
                })
            }
            Operation::CardSuspended { payload, timestamp } => {
                self.with_card(&payload.card_id, *timestamp, |card| {
                    if *timestamp <= card.stamps.suspended {
                        return false;
                    }
                    card.suspended = Some(payload.suspended);
                    card.stamps.suspended = *timestamp;
                    true
                })
            }
            Operation::CardMetadata { payload, timestamp } => {
                let applied = self.with_card(&payload.card_id, *timestamp, |card| {
                    if *timestamp <= card.stamps.metadata {
                        return false;
                    }
                    card.note_id = Some(payload.note_id.clone());
                    card.sibling_tag = Some(payload.sibling_tag.clone());
                    card.stamps.metadata = *timestamp;
                    true
                });
                if applied {
                    self.reindex_note(&payload.card_id);
                }
                applied
            }
            Operation::Deck { payload, timestamp } => {
                let deck = self
                    .decks
                    .entry(payload.id.clone())
                    .or_insert_with(|| Deck::template(payload.id.clone()));
                if *timestamp <= deck.last_modified {
                    false
                } else {
                    deck.name = payload.name.clone();
                    deck.description = payload.description.clone();
                    deck.deleted = payload.deleted;
                    deck.last_modified = *timestamp;
                    true
                }
            }
            Operation::UpdateDeckCard { payload, .. } => {
                let members = self.deck_cards.entry(payload.deck_id.clone()).or_default();
                match members.get(&payload.card_id) {
                    Some(&existing) if payload.count <= existing => false,
                    _ => {
                        members.insert(payload.card_id.clone(), payload.count);
                        true
                    }
                }
            }
            Operation::ReviewLog { .. } | Operation::ReviewLogDeleted { .. } => false,
        };

        if applied {
            self.version += 1;
        }
        applied
    }

    /// Applies multiple operations in caller-supplied order.
    ///
    /// Returns the number of operations that were actually applied. Does
    /// not notify; batching and notification are the caller's concern.
    pub fn apply_all(&mut self, ops: &[Operation]) -> usize {
        ops.iter().filter(|op| self.apply(op)).count()
    }

    /// Runs a field-group update against an existing card, or creates the
    /// card from the zero-value template when the id is unknown.
    ///
    /// Implicit creation always applies the update: a fresh template has
    /// zeroed stamps, and the creating operation's timestamp becomes both
    /// the group stamp and the card's creation time.
    fn with_card(
        &mut self,
        id: &str,
        timestamp: crate::clock::Timestamp,
        update: impl FnOnce(&mut Card) -> bool,
    ) -> bool {
        let card = self.cards.entry(id.to_string()).or_insert_with(|| {
            let mut card = Card::template(id);
            card.created_at = timestamp;
            card
        });
        update(card)
    }

    /// Rebuilds the sibling index entry for one card after a metadata change.
    fn reindex_note(&mut self, card_id: &str) {
        let note_id = self.cards.get(card_id).and_then(|c| c.note_id.clone());
        for ids in self.note_index.values_mut() {
            ids.retain(|id| id != card_id);
        }
        if let Some(note_id) = note_id {
            let ids = self.note_index.entry(note_id).or_default();
            if !ids.iter().any(|id| id == card_id) {
                ids.push(card_id.to_string());
            }
        }
    }

    /// Returns all cards, excluding deleted ones, sorted by creation time.
    ///
    /// Memoized until the next successful apply.
    pub fn cards(&self) -> Arc<Vec<Card>> {
        let mut caches = self.caches.lock().unwrap_or_else(|e| e.into_inner());
        if caches.version != self.version {
            *caches = Caches { version: self.version, ..Caches::default() };
        }
        caches
            .active_cards
            .get_or_insert_with(|| {
                let mut cards: Vec<Card> =
                    self.cards.values().filter(|c| !c.deleted).cloned().collect();
                cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
                Arc::new(cards)
            })
            .clone()
    }

    /// Returns a card by id, including deleted cards.
    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    /// Returns all decks, excluding deleted ones, sorted by name.
    ///
    /// Memoized until the next successful apply.
    pub fn decks(&self) -> Arc<Vec<Deck>> {
        let mut caches = self.caches.lock().unwrap_or_else(|e| e.into_inner());
        if caches.version != self.version {
            *caches = Caches { version: self.version, ..Caches::default() };
        }
        caches
            .active_decks
            .get_or_insert_with(|| {
                let mut decks: Vec<Deck> =
                    self.decks.values().filter(|d| !d.deleted).cloned().collect();
                decks.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                Arc::new(decks)
            })
            .clone()
    }

    /// Returns a deck by id, including deleted decks.
    pub fn deck(&self, id: &str) -> Option<&Deck> {
        self.decks.get(id)
    }

    /// Returns the cards currently belonging to a deck.
    ///
    /// Membership is the odd-parity entries of the counter map; deleted
    /// cards are excluded.
    pub fn cards_for_deck(&self, deck_id: &str) -> Vec<Card> {
        let Some(members) = self.deck_cards.get(deck_id) else {
            return Vec::new();
        };

        let mut cards: Vec<Card> = members
            .iter()
            .filter(|(_, &count)| count % 2 == 1)
            .filter_map(|(card_id, _)| self.cards.get(card_id))
            .filter(|card| !card.deleted)
            .cloned()
            .collect();
        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        cards
    }

    /// Returns the current membership counter for a (deck, card) pair.
    pub fn deck_card_count(&self, deck_id: &str, card_id: &str) -> u64 {
        self.deck_cards.get(deck_id).and_then(|m| m.get(card_id)).copied().unwrap_or(0)
    }

    /// Returns ids of sibling cards (sharing the same note id), excluding
    /// the given card.
    pub fn sibling_ids(&self, card_id: &str) -> Vec<String> {
        let Some(note_id) = self.cards.get(card_id).and_then(|c| c.note_id.as_deref()) else {
            return Vec::new();
        };
        self.note_index
            .get(note_id)
            .map(|ids| ids.iter().filter(|id| id.as_str() != card_id).cloned().collect())
            .unwrap_or_default()
    }

    /// Pushes an undo entry for a grading action.
    pub fn push_undo(&mut self, undo: UndoGrade) {
        self.undo_stack.push(undo);
    }

    /// Pops the most recent undo entry, if any.
    pub fn pop_undo(&mut self) -> Option<UndoGrade> {
        self.undo_stack.pop()
    }

    /// Returns the number of pending undo entries.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Registers a callback invoked on every [`notify`](Projection::notify).
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a previously registered callback.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Notifies subscribers that a batch of operations has been applied.
    ///
    /// Callers apply a whole batch, then notify once, so observers always
    /// see a consistent post-apply snapshot.
    pub fn notify(&self) {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for (_, callback) in subscribers.iter() {
            callback();
        }
    }
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
