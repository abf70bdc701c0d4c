// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::card::{CardState, Scheduling};
use crate::op::Operation;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc as StdArc;
use yare::parameterized;

fn content_op(card_id: &str, front: &str, back: &str, ts: u64) -> Operation {
    Operation::card_content(card_id.into(), front.into(), back.into(), ts)
}

#[test]
fn implicit_creation_on_first_reference() {
    let mut projection = Projection::new();

    assert!(projection.apply(&content_op("c1", "Front", "Back", 1000)));

    let card = projection.card("c1").unwrap();
    assert_eq!(card.front, "Front");
    assert_eq!(card.back, "Back");
    assert_eq!(card.created_at, 1000);
    assert_eq!(card.stamps.content, 1000);
    // Untouched groups keep zeroed stamps.
    assert_eq!(card.stamps.scheduling, 0);
}

#[test]
fn lww_idempotence() {
    let mut projection = Projection::new();
    let op = content_op("c1", "Front", "Back", 1000);

    assert!(projection.apply(&op));
    // Same operation again is stale-or-equal and silently dropped.
    assert!(!projection.apply(&op));

    let card = projection.card("c1").unwrap();
    assert_eq!(card.front, "Front");
    assert_eq!(card.stamps.content, 1000);
}

#[test]
fn lww_stale_write_dropped() {
    let mut projection = Projection::new();

    assert!(projection.apply(&content_op("c1", "New", "New", 2000)));
    assert!(!projection.apply(&content_op("c1", "Old", "Old", 1000)));

    assert_eq!(projection.card("c1").unwrap().front, "New");
}

#[test]
fn lww_field_independence() {
    let mut projection = Projection::new();

    let suspend = Operation::card_suspended("c1".into(), chrono::Utc::now(), 5000);
    assert!(projection.apply(&suspend));

    // An old content write must not disturb the suspended group.
    assert!(projection.apply(&content_op("c1", "Front", "Back", 1000)));

    let card = projection.card("c1").unwrap();
    assert_eq!(card.stamps.suspended, 5000);
    assert_eq!(card.stamps.content, 1000);
    assert!(card.suspended.is_some());
    assert_eq!(card.front, "Front");
}

#[test]
fn content_converges_regardless_of_order() {
    let a = content_op("c1", "A", "A", 1000);
    let b = content_op("c1", "B", "B", 2000);

    let mut forward = Projection::new();
    forward.apply(&a);
    forward.apply(&b);

    let mut reverse = Projection::new();
    reverse.apply(&b);
    reverse.apply(&a);

    assert_eq!(forward.card("c1").unwrap().front, "B");
    assert_eq!(reverse.card("c1").unwrap().front, "B");
}

#[parameterized(
    deleted = { Operation::card_deleted("c1".into(), true, 100) },
    bookmarked = { Operation::card_bookmarked("c1".into(), true, 100) },
    metadata = { Operation::card_metadata("c1".into(), "n1".into(), "c1-tag".into(), 100) },
)]
fn flag_groups_apply_and_reject_stale(op: Operation) {
    let mut projection = Projection::new();
    assert!(projection.apply(&op));
    assert!(!projection.apply(&op));
}

#[test]
fn scheduling_group_replaced_atomically() {
    let mut projection = Projection::new();

    let scheduling = Scheduling {
        stability: 3.5,
        reps: 4,
        state: CardState::Review,
        ..Scheduling::default()
    };
    assert!(projection.apply(&Operation::card("c1".into(), scheduling, 1000)));

    let card = projection.card("c1").unwrap();
    assert_eq!(card.scheduling.reps, 4);
    assert_eq!(card.scheduling.state, CardState::Review);
    assert_eq!(card.stamps.scheduling, 1000);
}

#[test]
fn deck_whole_record_lww() {
    let mut projection = Projection::new();

    let create = Operation::deck("d1".into(), "Deck".into(), "".into(), false, 1000);
    let rename = Operation::deck("d1".into(), "Renamed".into(), "desc".into(), false, 2000);
    let stale_delete = Operation::deck("d1".into(), "Gone".into(), "".into(), true, 1500);

    assert!(projection.apply(&create));
    assert!(projection.apply(&rename));
    // The whole record merges on one timestamp: a stale delete loses.
    assert!(!projection.apply(&stale_delete));

    let deck = projection.deck("d1").unwrap();
    assert_eq!(deck.name, "Renamed");
    assert!(!deck.deleted);
}

#[test]
fn deck_membership_counter_out_of_order() {
    let mut projection = Projection::new();

    let count = |n| Operation::update_deck_card("d1".into(), "c1".into(), n, 100);
    projection.apply(&content_op("c1", "F", "B", 50));

    assert!(projection.apply(&count(1)));
    assert_eq!(projection.cards_for_deck("d1").len(), 1);

    assert!(projection.apply(&count(2)));
    assert_eq!(projection.cards_for_deck("d1").len(), 0);

    // Out-of-order arrival of the older toggle: highest counter wins.
    assert!(!projection.apply(&count(1)));
    assert_eq!(projection.deck_card_count("d1", "c1"), 2);
    assert_eq!(projection.cards_for_deck("d1").len(), 0);
}

#[test]
fn cards_for_deck_excludes_deleted() {
    let mut projection = Projection::new();
    projection.apply(&content_op("c1", "F", "B", 50));
    projection.apply(&Operation::update_deck_card("d1".into(), "c1".into(), 1, 60));

    assert_eq!(projection.cards_for_deck("d1").len(), 1);

    projection.apply(&Operation::card_deleted("c1".into(), true, 70));
    assert_eq!(projection.cards_for_deck("d1").len(), 0);
}

#[test]
fn cards_snapshot_excludes_deleted_card_lookup_includes() {
    let mut projection = Projection::new();
    projection.apply(&content_op("c1", "F", "B", 50));
    projection.apply(&Operation::card_deleted("c1".into(), true, 60));

    assert!(projection.cards().is_empty());
    assert!(projection.card("c1").unwrap().deleted);
}

#[test]
fn decks_snapshot_excludes_deleted() {
    let mut projection = Projection::new();
    projection.apply(&Operation::deck("d1".into(), "Keep".into(), "".into(), false, 100));
    projection.apply(&Operation::deck("d2".into(), "Drop".into(), "".into(), true, 100));

    let decks = projection.decks();
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0].name, "Keep");
}

#[test]
fn sibling_index_tracks_metadata() {
    let mut projection = Projection::new();
    projection.apply(&content_op("c1", "F", "B", 10));
    projection.apply(&content_op("c2", "F", "B", 10));
    projection.apply(&content_op("c3", "F", "B", 10));
    projection.apply(&Operation::card_metadata("c1".into(), "n1".into(), "c1".into(), 20));
    projection.apply(&Operation::card_metadata("c2".into(), "n1".into(), "c2".into(), 20));
    projection.apply(&Operation::card_metadata("c3".into(), "n2".into(), "c1".into(), 20));

    let mut siblings = projection.sibling_ids("c1");
    siblings.sort();
    assert_eq!(siblings, vec!["c2".to_string()]);
    assert!(projection.sibling_ids("c3").is_empty());
}

#[test]
fn sibling_index_follows_note_reassignment() {
    let mut projection = Projection::new();
    projection.apply(&Operation::card_metadata("c1".into(), "n1".into(), "c1".into(), 10));
    projection.apply(&Operation::card_metadata("c2".into(), "n1".into(), "c2".into(), 10));
    assert_eq!(projection.sibling_ids("c2"), vec!["c1".to_string()]);

    projection.apply(&Operation::card_metadata("c1".into(), "n9".into(), "c1".into(), 20));
    assert!(projection.sibling_ids("c2").is_empty());
}

#[test]
fn review_log_operations_are_never_projected() {
    let mut projection = Projection::new();
    assert!(!projection.apply(&Operation::review_log_deleted("r1".into(), true, 100)));
    assert!(projection.cards().is_empty());
}

#[test]
fn snapshots_are_memoized_until_apply() {
    let mut projection = Projection::new();
    projection.apply(&content_op("c1", "F", "B", 10));

    let first = projection.cards();
    let second = projection.cards();
    assert!(StdArc::ptr_eq(&first, &second));

    projection.apply(&content_op("c2", "F", "B", 20));
    let third = projection.cards();
    assert!(!StdArc::ptr_eq(&first, &third));
    assert_eq!(third.len(), 2);
}

#[test]
fn rejected_apply_keeps_snapshot_cache() {
    let mut projection = Projection::new();
    projection.apply(&content_op("c1", "F", "B", 10));

    let before = projection.cards();
    assert!(!projection.apply(&content_op("c1", "Old", "Old", 5)));
    let after = projection.cards();
    assert!(StdArc::ptr_eq(&before, &after));
}

#[test]
fn subscribe_notify_unsubscribe() {
    let projection = Projection::new();
    let calls = StdArc::new(AtomicUsize::new(0));

    let calls_clone = calls.clone();
    let id = projection.subscribe(move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    projection.notify();
    projection.notify();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    projection.unsubscribe(id);
    projection.notify();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn undo_stack_is_lifo() {
    let mut projection = Projection::new();
    assert!(projection.pop_undo().is_none());

    projection.push_undo(UndoGrade {
        card: crate::card::Card::template("c1"),
        card_id: "c1".into(),
        review_log_id: "r1".into(),
    });
    projection.push_undo(UndoGrade {
        card: crate::card::Card::template("c2"),
        card_id: "c2".into(),
        review_log_id: "r2".into(),
    });

    assert_eq!(projection.undo_depth(), 2);
    assert_eq!(projection.pop_undo().unwrap().card_id, "c2");
    assert_eq!(projection.pop_undo().unwrap().card_id, "c1");
    assert!(projection.pop_undo().is_none());
}

#[test]
fn apply_all_counts_applied() {
    let mut projection = Projection::new();
    let ops = vec![
        content_op("c1", "F", "B", 100),
        content_op("c1", "F", "B", 100), // duplicate, dropped
        Operation::card_deleted("c1".into(), true, 200),
    ];

    assert_eq!(projection.apply_all(&ops), 2);
}
