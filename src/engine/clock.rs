//! Wall-clock sources for clock mode.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, Timelike};

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Reads the current time of day.
pub trait WallClock {
    /// Returns the number of seconds since local midnight.
    fn seconds_since_midnight(&self) -> u64;
}

/// The system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn seconds_since_midnight(&self) -> u64 {
        u64::from(Local::now().num_seconds_from_midnight())
    }
}

/// A settable clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    seconds: Arc<AtomicU64>,
}

impl FixedClock {
    /// Creates a clock showing `hours:minutes:seconds`.
    #[must_use]
    pub fn at(hours: u64, minutes: u64, seconds: u64) -> Self {
        let clock = Self::default();
        clock.set(hours * 3600 + minutes * 60 + seconds);
        clock
    }

    /// Sets the time of day, wrapping at midnight.
    pub fn set(&self, seconds_since_midnight: u64) {
        self.seconds
            .store(seconds_since_midnight % SECONDS_PER_DAY, Ordering::SeqCst);
    }

    /// Moves the clock forward, wrapping at midnight.
    pub fn advance(&self, seconds: u64) {
        let now = self.seconds.load(Ordering::SeqCst);
        self.set(now + seconds % SECONDS_PER_DAY);
    }
}

impl WallClock for FixedClock {
    fn seconds_since_midnight(&self) -> u64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_shares_time() {
        let clock = FixedClock::at(9, 30, 5);
        let view = clock.clone();

        assert_eq!(view.seconds_since_midnight(), 9 * 3600 + 30 * 60 + 5);

        clock.advance(55);
        assert_eq!(view.seconds_since_midnight(), 9 * 3600 + 31 * 60);
    }

    #[test]
    fn test_fixed_clock_wraps_at_midnight() {
        let clock = FixedClock::at(23, 59, 59);
        clock.advance(2);
        assert_eq!(clock.seconds_since_midnight(), 1);
    }

    #[test]
    fn test_system_clock_in_range() {
        assert!(SystemClock.seconds_since_midnight() < SECONDS_PER_DAY);
    }
}
