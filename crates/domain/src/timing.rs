//! Signed durations for lag and processing timings.
//!
//! Lag is measured against a timestamp stamped by another machine, so it can
//! legitimately be negative (clock skew, future timestamps). `SignedDuration`
//! carries that sign instead of clamping it away.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::time::{Duration, SystemTime};

/// A duration that may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SignedDuration {
    negative: bool,
    magnitude: Duration,
}

impl SignedDuration {
    /// Zero duration.
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: Duration::ZERO,
    };

    /// Wrap a non-negative standard duration.
    #[must_use]
    pub const fn from_std(duration: Duration) -> Self {
        Self {
            negative: false,
            magnitude: duration,
        }
    }

    /// Build a negative duration of the given magnitude (zero stays positive).
    #[must_use]
    pub const fn negative(magnitude: Duration) -> Self {
        Self {
            negative: !magnitude.is_zero(),
            magnitude,
        }
    }

    /// `later - earlier`, negative when `earlier` is after `later`.
    #[must_use]
    pub fn between(earlier: SystemTime, later: SystemTime) -> Self {
        match later.duration_since(earlier) {
            Ok(elapsed) => Self::from_std(elapsed),
            Err(error) => Self::negative(error.duration()),
        }
    }

    /// Returns true for strictly negative values.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.negative
    }

    /// Absolute value as a standard duration.
    #[must_use]
    pub const fn magnitude(self) -> Duration {
        self.magnitude
    }

    /// Signed whole microseconds.
    #[must_use]
    pub fn as_micros(self) -> i128 {
        let micros = i128::try_from(self.magnitude.as_micros()).unwrap_or(i128::MAX);
        if self.negative { -micros } else { micros }
    }

    /// Signed milliseconds with fractional part.
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        let millis = self.magnitude.as_secs_f64() * 1_000.0;
        if self.negative { -millis } else { millis }
    }
}

impl From<Duration> for SignedDuration {
    fn from(duration: Duration) -> Self {
        Self::from_std(duration)
    }
}

impl Neg for SignedDuration {
    type Output = Self;

    fn neg(self) -> Self {
        if self.negative {
            Self::from_std(self.magnitude)
        } else {
            Self::negative(self.magnitude)
        }
    }
}

impl Ord for SignedDuration {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SignedDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SignedDuration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.3}ms", self.as_millis_f64())
    }
}
