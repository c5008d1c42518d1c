//! Frame clock that turns wall time into whole-millisecond ticks.

use std::time::{Duration, Instant};

/// Periodic time source for one game session.
///
/// A stopped clock yields nothing. Fractional milliseconds are carried over
/// to the next call instead of being dropped.
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    last: Option<Instant>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) measuring from `now`.
    pub fn start(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Stop the clock. Stopping twice is fine.
    pub fn stop(&mut self) {
        self.last = None;
    }

    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }

    /// Whole milliseconds elapsed since the previous call (or `start`).
    pub fn elapsed_since_last(&mut self, now: Instant) -> Option<u32> {
        let last = self.last?;
        let ms = now.saturating_duration_since(last).as_millis();
        let ms = u32::try_from(ms).unwrap_or(u32::MAX);
        self.last = Some(last + Duration::from_millis(ms as u64));
        Some(ms)
    }
}
