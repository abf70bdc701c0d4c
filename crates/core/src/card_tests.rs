// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use yare::parameterized;

#[parameterized(
    new = { CardState::New, "New" },
    learning = { CardState::Learning, "Learning" },
    review = { CardState::Review, "Review" },
    relearning = { CardState::Relearning, "Relearning" },
)]
fn card_state_roundtrip(state: CardState, s: &str) {
    assert_eq!(state.as_str(), s);
    assert_eq!(s.parse::<CardState>().unwrap(), state);
}

#[test]
fn card_state_parse_rejects_unknown() {
    assert!("new".parse::<CardState>().is_err());
    assert!("".parse::<CardState>().is_err());
}

#[parameterized(
    manual = { Grade::Manual, "Manual" },
    again = { Grade::Again, "Again" },
    hard = { Grade::Hard, "Hard" },
    good = { Grade::Good, "Good" },
    easy = { Grade::Easy, "Easy" },
)]
fn grade_roundtrip(grade: Grade, s: &str) {
    assert_eq!(grade.as_str(), s);
    assert_eq!(s.parse::<Grade>().unwrap(), grade);
}

#[test]
fn card_template_is_zero_valued() {
    let card = Card::template("c1");
    assert_eq!(card.id, "c1");
    assert_eq!(card.front, "");
    assert_eq!(card.back, "");
    assert!(!card.deleted);
    assert!(!card.bookmarked);
    assert!(card.suspended.is_none());
    assert!(card.note_id.is_none());
    assert_eq!(card.created_at, 0);
    assert_eq!(card.stamps, FieldStamps::default());
    assert_eq!(card.scheduling.state, CardState::New);
    assert_eq!(card.scheduling.reps, 0);
}

#[test]
fn card_suspension_check() {
    let now = chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut card = Card::template("c1");
    assert!(!card.is_suspended_at(now));

    card.suspended = Some(now + chrono::Duration::hours(1));
    assert!(card.is_suspended_at(now));

    card.suspended = Some(now - chrono::Duration::hours(1));
    assert!(!card.is_suspended_at(now));
}

#[test]
fn suspension_helpers_order() {
    let now = chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    assert!(suspend_short(now) > now);
    assert!(suspend_forever() > suspend_short(now));
    assert!(unsuspended() < now);
}

#[test]
fn deck_template_is_zero_valued() {
    let deck = Deck::template("d1");
    assert_eq!(deck.name, "");
    assert!(!deck.deleted);
    assert_eq!(deck.last_modified, 0);
}

#[test]
fn scheduling_serde_uses_wire_names() {
    let scheduling = Scheduling::default();
    let json = serde_json::to_value(&scheduling).unwrap();
    assert!(json.get("elapsed_days").is_some());
    assert!(json.get("scheduled_days").is_some());
    assert!(json.get("last_review").is_some());
    assert_eq!(json.get("state").unwrap(), "New");
}
