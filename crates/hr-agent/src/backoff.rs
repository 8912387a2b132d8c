//! Reconnect backoff.
//!
//! Doubles the wait between consecutive failed connection attempts, saturating
//! at a ceiling, and drops back to the floor as soon as a connection opens.

use std::time::Duration;

/// Default delay before the first reconnect attempt.
pub const DEFAULT_FLOOR: Duration = Duration::from_millis(1000);

/// Default upper bound for the reconnect delay (10× the floor).
pub const DEFAULT_CEILING: Duration = Duration::from_millis(10_000);

/// Exponential reconnect delay bounded by `[floor, ceiling]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    /// Create a backoff starting at `floor`.
    ///
    /// A ceiling below the floor is raised to the floor.
    #[must_use]
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        let ceiling = ceiling.max(floor);
        Self {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// Delay to wait before the next attempt.
    #[must_use]
    pub fn current(&self) -> Duration {
        self.current
    }

    #[must_use]
    pub fn floor(&self) -> Duration {
        self.floor
    }

    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Return to the floor after a successful open.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// Take the delay for the upcoming wait and double it for the one after.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        delay
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_FLOOR, DEFAULT_CEILING)
    }
}
