// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side mutation entry points.
//!
//! The `Client` owns the projection and its durable stores. Every mutation
//! is expressed as operations which are applied to the projection
//! synchronously, appended to the full history log and the pending queue,
//! and announced with a single notify per batch. Remote batches arrive
//! through [`Client::apply_remote`] with server-assigned sequence numbers.
//!
//! Mutations never await mid-flight: the projection update is atomic per
//! batch, and the durable appends happen after the in-memory state is
//! already consistent.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::card::{Grade, ReviewLogEntry, Scheduling, SiblingMetadata};
use crate::clock::{Clock, MonotonicClock};
use crate::error::{Error, Result};
use crate::op::{Operation, SequencedOperation};
use crate::projection::{Projection, UndoGrade};
use crate::scheduler::Scheduler;
use crate::store::Persistence;

/// Upper bound recorded for a single review, in milliseconds.
///
/// Durations above this are assumed to be an idle tab, not thinking time.
pub const MAX_REVIEW_DURATION_MS: u64 = 2 * 60 * 1000;

/// The client: projection plus durable stores plus a clock.
pub struct Client<P: Persistence, C: Clock = MonotonicClock> {
    projection: Projection,
    store: P,
    clock: C,
}

impl<P: Persistence> Client<P, MonotonicClock> {
    /// Opens a client over the given store, replaying the full operation
    /// log to rebuild the projection.
    pub fn open(store: P) -> Result<Self> {
        Self::with_clock(store, MonotonicClock::new())
    }
}

impl<P: Persistence, C: Clock> Client<P, C> {
    /// Opens a client with a custom clock (for testing).
    pub fn with_clock(store: P, clock: C) -> Result<Self> {
        let mut projection = Projection::new();
        let history = store.load_operations()?;
        let applied = projection.apply_all(&history);
        debug!(total = history.len(), applied, "replayed operation log");

        Ok(Client { projection, store, clock })
    }

    /// Returns the projection for snapshot reads and subscriptions.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Returns the established client identity, if any.
    pub fn client_id(&self) -> Result<Option<String>> {
        self.store.client_id()
    }

    /// Establishes the client identity used by the sync transport.
    pub fn set_client_id(&mut self, id: &str) -> Result<()> {
        self.store.set_client_id(id)
    }

    /// Returns the operations waiting for transport acknowledgment.
    pub fn pending_operations(&self) -> Result<Vec<Operation>> {
        self.store.load_pending()
    }

    /// Removes the first `count` pending operations after a successful push.
    pub fn acknowledge_pending(&mut self, count: usize) -> Result<()> {
        self.store.remove_pending(count)
    }

    /// Returns the highest remote sequence number applied so far.
    pub fn last_applied_seq_no(&self) -> Result<u64> {
        self.store.last_applied_seq_no()
    }

    /// Creates a new card, optionally placed into decks and tagged with
    /// sibling metadata. Returns the new card id.
    pub fn create_card(
        &mut self,
        front: &str,
        back: &str,
        deck_ids: &[String],
        metadata: Option<SiblingMetadata>,
    ) -> Result<String> {
        let now = self.clock.now_ms();
        let id = Uuid::new_v4().to_string();

        let scheduling = Scheduling { due: self.clock.now_utc(), ..Scheduling::default() };

        let mut ops = vec![
            Operation::card(id.clone(), scheduling, now),
            Operation::card_content(id.clone(), front.to_string(), back.to_string(), now),
        ];
        for deck_id in deck_ids {
            ops.push(Operation::update_deck_card(deck_id.clone(), id.clone(), 1, now));
        }
        if let Some(meta) = metadata {
            ops.push(Operation::card_metadata(id.clone(), meta.note_id, meta.sibling_tag, now));
        }

        for op in &ops {
            self.apply_fresh(op);
        }

        self.store.append_operations(&ops)?;
        self.store.append_pending(&ops)?;
        self.projection.notify();

        Ok(id)
    }

    /// Creates a new deck. Returns the new deck id.
    pub fn create_deck(&mut self, name: &str, description: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let op = Operation::deck(
            id.clone(),
            name.to_string(),
            description.to_string(),
            false,
            self.clock.now_ms(),
        );

        self.apply_fresh(&op);
        self.store.append_operations(std::slice::from_ref(&op))?;
        self.store.append_pending(std::slice::from_ref(&op))?;
        self.projection.notify();

        Ok(id)
    }

    /// Updates a deck's record (name, description, deleted flag).
    pub fn update_deck(
        &mut self,
        deck_id: &str,
        name: &str,
        description: &str,
        deleted: bool,
    ) -> Result<bool> {
        if self.projection.deck(deck_id).is_none() {
            return Err(Error::DeckNotFound(deck_id.to_string()));
        }
        let op = Operation::deck(
            deck_id.to_string(),
            name.to_string(),
            description.to_string(),
            deleted,
            self.clock.now_ms(),
        );
        self.handle_local(op)
    }

    /// Replaces a card's front/back text.
    pub fn update_card_content(&mut self, card_id: &str, front: &str, back: &str) -> Result<bool> {
        self.require_card(card_id)?;
        let op = Operation::card_content(
            card_id.to_string(),
            front.to_string(),
            back.to_string(),
            self.clock.now_ms(),
        );
        self.handle_local(op)
    }

    /// Sets or clears a card's soft-delete flag.
    pub fn set_card_deleted(&mut self, card_id: &str, deleted: bool) -> Result<bool> {
        self.require_card(card_id)?;
        let op = Operation::card_deleted(card_id.to_string(), deleted, self.clock.now_ms());
        self.handle_local(op)
    }

    /// Sets or clears a card's bookmark flag.
    pub fn set_card_bookmarked(&mut self, card_id: &str, bookmarked: bool) -> Result<bool> {
        self.require_card(card_id)?;
        let op = Operation::card_bookmarked(card_id.to_string(), bookmarked, self.clock.now_ms());
        self.handle_local(op)
    }

    /// Suspends a card until the given instant.
    pub fn set_card_suspended(
        &mut self,
        card_id: &str,
        suspended: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool> {
        self.require_card(card_id)?;
        let op = Operation::card_suspended(card_id.to_string(), suspended, self.clock.now_ms());
        self.handle_local(op)
    }

    /// Toggles a card's membership in a deck.
    ///
    /// Emits the current counter plus one; parity decides membership, so
    /// the same call adds and removes.
    pub fn toggle_deck_membership(&mut self, deck_id: &str, card_id: &str) -> Result<bool> {
        let count = self.projection.deck_card_count(deck_id, card_id) + 1;
        let op = Operation::update_deck_card(
            deck_id.to_string(),
            card_id.to_string(),
            count,
            self.clock.now_ms(),
        );
        self.handle_local(op)
    }

    /// Grades a card: advances its scheduling through the scheduler
    /// collaborator, records a review log entry, pushes an undo snapshot,
    /// and buries sibling cards until tomorrow.
    pub fn grade_card(
        &mut self,
        card_id: &str,
        grade: Grade,
        duration_ms: u64,
        scheduler: &dyn Scheduler,
    ) -> Result<()> {
        let card = self
            .projection
            .card(card_id)
            .cloned()
            .ok_or_else(|| Error::CardNotFound(card_id.to_string()))?;

        let now = self.clock.now_ms();
        let now_utc = self.clock.now_utc();
        let next = scheduler.next(&card.scheduling, grade, now_utc);

        if duration_ms > MAX_REVIEW_DURATION_MS {
            warn!(card_id, duration_ms, "clamping review duration");
        }
        let duration = duration_ms.min(MAX_REVIEW_DURATION_MS);

        let entry = ReviewLogEntry {
            id: Uuid::new_v4().to_string(),
            card_id: card_id.to_string(),
            grade,
            state: next.state,
            due: next.due,
            stability: next.stability,
            difficulty: next.difficulty,
            elapsed_days: next.elapsed_days,
            last_elapsed_days: card.scheduling.elapsed_days,
            scheduled_days: next.scheduled_days,
            review: now_utc,
            duration,
            created_at: now_utc,
        };

        let card_op = Operation::card(card_id.to_string(), next, now);
        let review_op = Operation::review_log(&entry, now);
        self.apply_fresh(&card_op);

        self.projection.push_undo(UndoGrade {
            card,
            card_id: card_id.to_string(),
            review_log_id: entry.id.clone(),
        });

        let bury_ops = self.bury_siblings(card_id);

        let mut history = vec![card_op.clone()];
        history.extend(bury_ops.iter().cloned());
        self.store.append_operations(&history)?;
        self.store.append_review_logs(std::slice::from_ref(&review_op))?;

        let mut pending = vec![card_op, review_op];
        pending.extend(bury_ops);
        self.store.append_pending(&pending)?;

        self.projection.notify();
        Ok(())
    }

    /// Suspends sibling cards until next-day midnight, skipping deleted
    /// siblings and siblings already suspended past that point (including
    /// indefinitely buried ones).
    fn bury_siblings(&mut self, card_id: &str) -> Vec<Operation> {
        let tomorrow = match (self.clock.now_utc() + chrono::Duration::days(1))
            .date_naive()
            .and_hms_opt(0, 0, 0)
        {
            Some(dt) => dt.and_utc(),
            None => return Vec::new(),
        };

        let mut ops = Vec::new();
        for sibling_id in self.projection.sibling_ids(card_id) {
            let Some(sibling) = self.projection.card(&sibling_id) else {
                continue;
            };
            if sibling.deleted {
                continue;
            }
            if sibling.suspended.is_some_and(|until| until > tomorrow) {
                continue;
            }

            debug!(card_id, sibling_id = sibling_id.as_str(), "burying sibling until tomorrow");
            let op = Operation::card_suspended(sibling_id, tomorrow, self.clock.now_ms());
            self.projection.apply(&op);
            ops.push(op);
        }
        ops
    }

    /// Undoes the most recent grading action: restores the prior scheduling
    /// snapshot and marks the associated review log entry deleted.
    ///
    /// Returns false if there is nothing to undo.
    pub fn undo_grade(&mut self) -> Result<bool> {
        let Some(undo) = self.projection.pop_undo() else {
            return Ok(false);
        };
        if self.projection.card(&undo.card_id).is_none() {
            return Ok(false);
        }

        let now = self.clock.now_ms();
        let card_op = Operation::card(undo.card_id.clone(), undo.card.scheduling.clone(), now);
        let deleted_op = Operation::review_log_deleted(undo.review_log_id, true, now);

        self.apply_fresh(&card_op);

        self.store.append_operations(std::slice::from_ref(&card_op))?;
        self.store.append_review_logs(std::slice::from_ref(&deleted_op))?;
        self.store.append_pending(&[card_op, deleted_op])?;

        self.projection.notify();
        Ok(true)
    }

    /// Applies a batch of remote operations delivered in sequence order.
    ///
    /// Operations at or below the stored high-water mark are dropped (the
    /// duplicates an at-least-once transport can deliver); the mark then
    /// advances to the batch maximum. Returns the number of operations that
    /// changed the projection.
    pub fn apply_remote(&mut self, batch: &[SequencedOperation]) -> Result<usize> {
        let last = self.store.last_applied_seq_no()?;
        let Some(highest) = batch.iter().map(|s| s.seq_no).max() else {
            return Ok(0);
        };
        if highest <= last {
            return Ok(0);
        }

        let fresh: Vec<&SequencedOperation> =
            batch.iter().filter(|s| s.seq_no > last).collect();

        let mut applied_ops = Vec::new();
        let mut review_ops = Vec::new();
        for sequenced in &fresh {
            if sequenced.op.is_review_log() {
                review_ops.push(sequenced.op.clone());
                continue;
            }
            if self.projection.apply(&sequenced.op) {
                applied_ops.push(sequenced.op.clone());
            }
        }

        self.store.append_operations(&applied_ops)?;
        self.store.append_review_logs(&review_ops)?;
        self.store.set_last_applied_seq_no(highest)?;

        if !fresh.is_empty() {
            self.projection.notify();
        }

        debug!(
            batch = batch.len(),
            fresh = fresh.len(),
            applied = applied_ops.len(),
            seq_no = highest,
            "applied remote batch"
        );
        Ok(applied_ops.len())
    }

    fn require_card(&self, card_id: &str) -> Result<()> {
        if self.projection.card(card_id).is_none() {
            return Err(Error::CardNotFound(card_id.to_string()));
        }
        Ok(())
    }

    /// Applies and persists a single locally created operation.
    ///
    /// Returns whether the operation was applied; persistence only happens
    /// for applied operations, so a stale write leaves no trace.
    fn handle_local(&mut self, op: Operation) -> Result<bool> {
        if !self.projection.apply(&op) {
            return Ok(false);
        }

        self.store.append_operations(std::slice::from_ref(&op))?;
        self.store.append_pending(std::slice::from_ref(&op))?;
        self.projection.notify();
        Ok(true)
    }

    /// Applies an operation that cannot conflict: a freshly minted id, or a
    /// timestamp newer than anything the entity has seen. A rejection here
    /// is a defect, so it crashes loudly instead of being masked.
    #[allow(clippy::panic)]
    fn apply_fresh(&mut self, op: &Operation) {
        if !self.projection.apply(op) {
            panic!("operation for fresh entity was rejected: {op:?}");
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
