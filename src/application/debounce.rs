//! Trailing-edge debounce timer
//!
//! An explicit timer handle instead of a debounced closure: the owner calls
//! `reset()` on every triggering event and checks `is_due()` from its event
//! loop. All methods take the current `Instant` so callers (and tests) control
//! the clock.

use std::time::{Duration, Instant};

/// Quiet period before a project build is committed
pub const BUILD_DEBOUNCE_MS: u64 = 5000;

/// Minimum spacing between preview notifications
pub const PREVIEW_DEBOUNCE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the quiet period from `now`
    pub fn reset(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm the timer
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the quiet period has fully elapsed
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Disarm and report whether the timer had fired
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Time left until the timer fires; `None` when disarmed
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
