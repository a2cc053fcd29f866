//! Alert thresholds: forecast horizon, confidence tiers, and wave range.
//!
//! Forecast skill decays with lead time, so the minimum rating needed to
//! alert is lowest a few days out and highest for today. All functions take
//! the current moment as a parameter; nothing here reads the clock.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::config::AlertConfig;
use crate::model::ForecastDay;
use crate::rating::RatingKey;

/// Local hour at or after which a same-day alert is too late to act on.
/// Fixed rather than configurable.
pub const DAWN_PATROL_CUTOFF_HOUR: u32 = 8;

/// Whole calendar days from `now`'s date to `date`. Time of day is ignored,
/// so 23:59 today and 00:01 tomorrow are one day apart. Negative for past
/// dates.
pub fn days_out(date: NaiveDate, now: NaiveDateTime) -> i64 {
    date.signed_duration_since(now.date()).num_days()
}

/// True once the dawn-patrol cutoff has passed for a same-day forecast.
pub fn past_dawn_patrol(now: NaiveDateTime) -> bool {
    now.hour() >= DAWN_PATROL_CUTOFF_HOUR
}

/// Minimum rating required to alert `days_out` days ahead.
///
/// | days out | minimum       |
/// |----------|---------------|
/// | 0        | Good          |
/// | 1–3      | Fair          |
/// | 4+       | Fair to Good  |
///
/// Negative inputs are treated as today; the evaluator rejects past dates
/// before asking.
pub fn min_rating_for(days_out: i64) -> RatingKey {
    match days_out {
        i64::MIN..=0 => RatingKey::Good,
        1..=3 => RatingKey::Fair,
        _ => RatingKey::FairToGood,
    }
}

/// Outcome of comparing a day's wave range with the configured range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveFit {
    /// The ranges overlap, even partially.
    InRange,
    /// Largest forecast wave is below the configured minimum.
    TooSmall,
    /// Smallest forecast wave is above the configured maximum.
    TooBig,
}

/// Overlap test between `[day.wave_min_ft, day.wave_max_ft]` and
/// `[config.wave_min_ft, config.wave_max_ft]`, both inclusive.
pub fn wave_fit(day: &ForecastDay, config: &AlertConfig) -> WaveFit {
    if day.wave_max_ft < config.wave_min_ft {
        WaveFit::TooSmall
    } else if day.wave_min_ft > config.wave_max_ft {
        WaveFit::TooBig
    } else {
        WaveFit::InRange
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
