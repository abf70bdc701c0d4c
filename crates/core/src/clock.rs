// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock timestamps for last-writer-wins conflict resolution.
//!
//! Every operation carries the client wall-clock time (milliseconds since
//! Unix epoch) at which it was created. Merging compares these timestamps
//! per field group; ties and older writes lose.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since Unix epoch.
pub type Timestamp = u64;

/// Trait for getting the current wall clock time.
///
/// This allows injecting a fixed clock for testing.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> Timestamp;

    /// Returns the current time as a UTC datetime.
    fn now_utc(&self) -> DateTime<Utc> {
        match Utc.timestamp_millis_opt(self.now_ms() as i64) {
            chrono::LocalResult::Single(dt) => dt,
            _ => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

impl<C: Clock> Clock for &C {
    fn now_ms(&self) -> Timestamp {
        (*self).now_ms()
    }
}

/// A clock that never returns the same timestamp twice.
///
/// Local mutations merge with a strictly-greater-than rule, so two
/// operations minted at the same wall millisecond would shadow each other.
/// This wrapper advances past the last handed-out timestamp even if the
/// wall clock stalls or goes backwards.
pub struct MonotonicClock<C: Clock = SystemClock> {
    inner: C,
    last_ms: Mutex<Timestamp>,
}

impl MonotonicClock<SystemClock> {
    /// Creates a monotonic clock over the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MonotonicClock<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MonotonicClock<C> {
    /// Creates a monotonic clock over a custom clock source.
    pub fn with_clock(inner: C) -> Self {
        MonotonicClock { inner, last_ms: Mutex::new(0) }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now_ms(&self) -> Timestamp {
        let physical = self.inner.now_ms();
        let mut last = self.last_ms.lock().unwrap_or_else(|e| e.into_inner());
        *last = if physical > *last { physical } else { *last + 1 };
        *last
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
