//! Clock boundary contract.

use std::time::{Instant, SystemTime};

/// Source of wall-clock and monotonic time.
///
/// Wall-clock time is used for lag (compared against producer timestamps);
/// monotonic time is used for processing durations.
pub trait ClockPort: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Current monotonic instant.
    fn monotonic(&self) -> Instant;
}

/// `ClockPort` backed by the operating system clocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn monotonic(&self) -> Instant {
        Instant::now()
    }
}
