//! Remaining-time calculation for a running countdown

use std::time::{Duration, Instant};

use super::TimeSpan;

/// Compute what is left of `total` when it started at `started_at`, as seen at `now`.
///
/// Partial seconds round up, so the value only reaches zero once the full
/// duration has elapsed.
///
/// The result is derived from the absolute end point rather than by counting
/// ticks, so it does not drift no matter how often it is polled. Once the end
/// point has passed the result is zero or negative; compare it against
/// [`TimeSpan::zero`] with `<=`.
///
/// An end point too far away to represent as an `Instant` leaves the full
/// length remaining.
pub fn remaining_duration(started_at: Instant, total: TimeSpan, now: Instant) -> TimeSpan {
    let total_seconds = total.total_seconds();
    let length = Duration::from_secs(total_seconds.max(0) as u64);
    let Some(end) = started_at.checked_add(length) else {
        return TimeSpan::from_total_seconds(total_seconds);
    };

    let seconds_to_end = if now <= end {
        let until_end = end - now;
        let whole = until_end.as_secs() as i64;
        if until_end.subsec_nanos() > 0 { whole + 1 } else { whole }
    } else {
        -((now - end).as_secs() as i64)
    };

    TimeSpan::from_total_seconds(seconds_to_end)
}
