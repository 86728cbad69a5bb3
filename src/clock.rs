//! Time source for sessions.
//!
//! The elapsed-time display is a pure read: presentation code calls
//! [`elapsed_seconds`] on its own schedule and nothing in the game reacts to it.

use chrono::Utc;
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.set(now_ms);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_ms(secs.saturating_mul(1000));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// Whole seconds between `start_ms` and `now_ms`, floored and never negative.
pub fn elapsed_seconds(now_ms: i64, start_ms: i64) -> u64 {
    u64::try_from(now_ms.saturating_sub(start_ms) / 1000).unwrap_or(0)
}
