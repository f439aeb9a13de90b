//! Hours/minutes/seconds value type used for durations and remaining time

use std::fmt;

use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;

/// Longest duration a countdown accepts
pub const MAX_DURATION_SECONDS: i64 = 10_000 * SECONDS_PER_HOUR;

/// A duration split into hours, minutes and seconds.
///
/// Values built from user input may be denormalized (e.g. 90 minutes); every
/// value produced by [`TimeSpan::decrement`] or [`TimeSpan::from_total_seconds`]
/// keeps minutes and seconds within `0..=59` for non-negative totals.
///
/// Field order matters: the derived ordering is lexicographic on
/// `(hours, minutes, seconds)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeSpan {
    pub const fn new(hours: i64, minutes: i64, seconds: i64) -> Self {
        Self { hours, minutes, seconds }
    }

    /// The completion sentinel and floor of every countdown
    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Decompose a whole number of seconds using truncating division
    pub const fn from_total_seconds(total: i64) -> Self {
        let hours = total / SECONDS_PER_HOUR;
        let rest = total - hours * SECONDS_PER_HOUR;
        let minutes = rest / SECONDS_PER_MINUTE;
        let seconds = rest - minutes * SECONDS_PER_MINUTE;
        Self::new(hours, minutes, seconds)
    }

    /// Total length in seconds, saturating at the `i64` bounds
    pub const fn total_seconds(&self) -> i64 {
        self.hours
            .saturating_mul(SECONDS_PER_HOUR)
            .saturating_add(self.minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(self.seconds)
    }

    /// Total length in seconds, or `None` if it does not fit in an `i64`
    pub fn checked_total_seconds(&self) -> Option<i64> {
        self.hours
            .checked_mul(SECONDS_PER_HOUR)?
            .checked_add(self.minutes.checked_mul(SECONDS_PER_MINUTE)?)?
            .checked_add(self.seconds)
    }

    /// True if any component is positive
    pub const fn is_positive(&self) -> bool {
        self.hours > 0 || self.minutes > 0 || self.seconds > 0
    }

    /// True if this can be used as a countdown length: no negative component
    /// and no longer than [`MAX_DURATION_SECONDS`]
    pub fn is_valid_duration(&self) -> bool {
        self.hours >= 0
            && self.minutes >= 0
            && self.seconds >= 0
            && matches!(self.checked_total_seconds(), Some(total) if total <= MAX_DURATION_SECONDS)
    }

    /// Subtract one second, borrowing from minutes and then hours.
    ///
    /// Decrementing `zero()` yields `(-1, 59, 59)`; the countdown never does
    /// this because it stops at zero.
    pub fn decrement(&mut self) -> &mut Self {
        self.seconds -= 1;
        if self.seconds < 0 {
            self.seconds = 59;
            self.minutes -= 1;
            if self.minutes < 0 {
                self.minutes = 59;
                self.hours -= 1;
            }
        }
        self
    }

    /// Return a decremented copy, leaving `self` untouched
    pub fn decremented(mut self) -> Self {
        self.decrement();
        self
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}
