//! Per-day alert evaluation and batch helpers.
//!
//! Evaluation is pure: every function takes the forecast, the config, and
//! the current local moment, and returns a decision. Nothing here fails;
//! defective input degrades to "no alert".

use chrono::{Datelike, Days, NaiveDateTime, Weekday};

use crate::alert::thresholds::{WaveFit, days_out, min_rating_for, past_dawn_patrol, wave_fit};
use crate::config::AlertConfig;
use crate::model::{Alert, AlertDecision, ForecastDay, Location, LocationForecast};

// ---------------------------------------------------------------------------
// Single day
// ---------------------------------------------------------------------------

/// Decides whether one forecast day is alert-worthy at `now`.
///
/// Checks run in order and the first failure wins: past date, same-day
/// cutoff, wave range, then the rating tier for the day's lead time.
pub fn evaluate(day: &ForecastDay, config: &AlertConfig, now: NaiveDateTime) -> AlertDecision {
    let out = days_out(day.date, now);

    if out < 0 {
        return decline(day, "date is in the past".to_string());
    }

    if out == 0 && past_dawn_patrol(now) {
        return decline(day, "too late for same-day alert".to_string());
    }

    match wave_fit(day, config) {
        WaveFit::TooSmall => {
            return decline(
                day,
                format!(
                    "too small ({}ft max < {}ft minimum)",
                    day.wave_max_ft, config.wave_min_ft
                ),
            );
        }
        WaveFit::TooBig => {
            return decline(
                day,
                format!(
                    "too big ({}ft min > {}ft maximum)",
                    day.wave_min_ft, config.wave_max_ft
                ),
            );
        }
        WaveFit::InRange => {}
    }

    let required = min_rating_for(out);
    if day.rating.rank() < required.rank() {
        return decline(
            day,
            format!(
                "{} is below {} required {}",
                day.rating,
                required,
                describe_days_out(out)
            ),
        );
    }

    let weekend = if is_weekend(day) { " (weekend)" } else { "" };
    AlertDecision {
        forecast_day: day.clone(),
        should_alert: true,
        reason: format!(
            "{} conditions, {}-{}ft, {}{}",
            day.rating,
            day.wave_min_ft,
            day.wave_max_ft,
            describe_days_out(out),
            weekend
        ),
    }
}

fn decline(day: &ForecastDay, reason: String) -> AlertDecision {
    AlertDecision {
        forecast_day: day.clone(),
        should_alert: false,
        reason,
    }
}

/// "today", "tomorrow", or "N days out".
pub fn describe_days_out(days_out: i64) -> String {
    match days_out {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("{} days out", n),
    }
}

/// Friday through Sunday.
pub fn is_weekend(day: &ForecastDay) -> bool {
    matches!(day.date.weekday(), Weekday::Fri | Weekday::Sat | Weekday::Sun)
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// True if `day` falls on or before `now + forecast_window_days`.
pub fn within_window(day: &ForecastDay, config: &AlertConfig, now: NaiveDateTime) -> bool {
    match now
        .date()
        .checked_add_days(Days::new(u64::from(config.forecast_window_days)))
    {
        Some(last) => day.date <= last,
        None => true,
    }
}

/// Evaluates every day inside the look-ahead window, preserving input order.
/// Days beyond the window produce no decision at all.
pub fn evaluate_all(
    days: &[ForecastDay],
    config: &AlertConfig,
    now: NaiveDateTime,
) -> Vec<AlertDecision> {
    days.iter()
        .filter(|day| within_window(day, config, now))
        .map(|day| evaluate(day, config, now))
        .collect()
}

/// Bundles the alert-worthy days for one location, or `None` if there are
/// none.
pub fn generate_alert(
    location: &Location,
    days: &[ForecastDay],
    config: &AlertConfig,
    now: NaiveDateTime,
) -> Option<Alert> {
    alert_from_decisions(location, &evaluate_all(days, config, now))
}

/// Collects the alerting days from already-computed decisions.
pub fn alert_from_decisions(location: &Location, decisions: &[AlertDecision]) -> Option<Alert> {
    let alerting: Vec<ForecastDay> = decisions
        .iter()
        .filter(|d| d.should_alert)
        .map(|d| d.forecast_day.clone())
        .collect();

    if alerting.is_empty() {
        None
    } else {
        Some(Alert {
            location: location.clone(),
            days: alerting,
        })
    }
}

/// Runs `generate_alert` for each location, keeping location order.
pub fn evaluate_locations(
    forecasts: &[LocationForecast],
    config: &AlertConfig,
    now: NaiveDateTime,
) -> Vec<Alert> {
    forecasts
        .iter()
        .filter_map(|f| generate_alert(&f.location, &f.days, config, now))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
