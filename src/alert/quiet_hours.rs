//! Quiet-hours gate.
//!
//! Answers "is now a quiet moment?" and nothing else. It gates delivery of
//! alerts, never evaluation, and is independent of which forecast day is
//! being reported.

use chrono::{NaiveDateTime, Timelike};

use crate::config::QuietHours;

/// True if `now` falls inside `[start_hour, end_hour)`.
///
/// When `start_hour > end_hour` the window wraps past midnight (22 → 6
/// covers 22:00–05:59). When `start_hour == end_hour` the window is empty
/// and nothing is ever suppressed.
pub fn is_suppressed(quiet_hours: &QuietHours, now: NaiveDateTime) -> bool {
    if !quiet_hours.enabled {
        return false;
    }

    let hour = now.hour();
    let (start, end) = (quiet_hours.start_hour, quiet_hours.end_hour);

    if start > end {
        hour >= start || hour < end
    } else {
        start <= hour && hour < end
    }
}
