/// Alert record staleness.
///
/// Dedup records only matter while their forecast date could still be
/// re-evaluated. Once a record's date falls out of the retention window it
/// can be dropped, which keeps the state file from growing forever.
///
/// # Clock injection
/// All functions accept `now` rather than calling `Utc::now()`, so pruning
/// is deterministic in tests.

use chrono::{DateTime, Days, Utc};

/// Days of alert history kept in the state file.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// ISO date (`YYYY-MM-DD`) of the oldest record date still retained.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> String {
    let today = now.date_naive();
    today
        .checked_sub_days(Days::new(u64::from(retention_days)))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

/// The date half of a `location:date` dedup key. Keys without a separator
/// are returned whole.
pub fn key_date(key: &str) -> &str {
    key.rsplit_once(':').map(|(_, date)| date).unwrap_or(key)
}

/// Returns `true` if the record's date sorts strictly before `cutoff`.
///
/// ISO dates order lexically, so no parsing is needed; a record dated
/// exactly on the cutoff is kept.
pub fn is_stale_key(key: &str, cutoff: &str) -> bool {
    key_date(key) < cutoff
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
