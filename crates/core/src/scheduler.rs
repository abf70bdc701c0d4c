// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Seam for the spaced-repetition scheduling algorithm.
//!
//! The algorithm itself is an external collaborator: the core only needs a
//! function from (current scheduling, grade, now) to the next scheduling
//! snapshot. Grading flows in [`Client`](crate::client::Client) build the
//! review log entry around whatever the scheduler returns.

use chrono::{DateTime, Utc};

use crate::card::{Grade, Scheduling};

/// Maps a card's scheduling state and a grade to its next scheduling state.
///
/// Implementations must be pure: no side effects, no internal clock (the
/// review instant is passed in), so grading stays replayable and testable.
pub trait Scheduler {
    /// Returns the scheduling snapshot after reviewing with `grade` at `now`.
    fn next(&self, current: &Scheduling, grade: Grade, now: DateTime<Utc>) -> Scheduling;
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn next(&self, current: &Scheduling, grade: Grade, now: DateTime<Utc>) -> Scheduling {
        (*self).next(current, grade, now)
    }
}
