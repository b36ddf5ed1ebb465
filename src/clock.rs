//! Time source for round timestamps
//!
//! Training rounds are anchored at "now". The clock is injected so runs are
//! reproducible under test.

use chrono::{Local, NaiveDateTime, Timelike};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current local time, whole seconds.
    fn now(&self) -> NaiveDateTime;
}

/// Local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        // Table timestamps have second resolution
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    /// Create a clock that always reports `at`.
    #[must_use]
    pub const fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
