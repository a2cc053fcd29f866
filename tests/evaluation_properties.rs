//! Property tests for evaluation and quiet hours.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use surfmon_service::alert::evaluate::evaluate;
use surfmon_service::alert::quiet_hours::is_suppressed;
use surfmon_service::alert::thresholds::min_rating_for;
use surfmon_service::config::{AlertConfig, QuietHours};
use surfmon_service::model::ForecastDay;
use surfmon_service::rating::{RATING_SCALE, RatingKey};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn now_at(hour: u32, minute: u32) -> NaiveDateTime {
    base_date().and_hms_opt(hour, minute, 0).unwrap()
}

fn day(offset: i64, min: f64, max: f64, rating: RatingKey) -> ForecastDay {
    ForecastDay {
        location_id: "spot".to_string(),
        date: base_date() + Duration::days(offset),
        wave_min_ft: min,
        wave_max_ft: max,
        rating,
        wind: None,
    }
}

fn any_rating() -> impl Strategy<Value = RatingKey> {
    (0..=RATING_SCALE.len())
        .prop_map(|i| RATING_SCALE.get(i).map(|e| e.key).unwrap_or(RatingKey::Unknown))
}

fn any_config() -> impl Strategy<Value = AlertConfig> {
    (0.0f64..10.0, 0.0f64..10.0, 0u32..14).prop_map(|(a, b, window)| AlertConfig {
        wave_min_ft: a.min(b),
        wave_max_ft: a.max(b),
        forecast_window_days: window,
        quiet_hours: QuietHours::default(),
    })
}

proptest! {
    #[test]
    fn past_days_never_alert(
        offset in -60i64..0,
        min in 0.0f64..10.0,
        span in 0.0f64..5.0,
        rating in any_rating(),
        config in any_config(),
        hour in 0u32..24,
    ) {
        let decision = evaluate(&day(offset, min, min + span, rating), &config, now_at(hour, 0));
        prop_assert!(!decision.should_alert);
    }

    #[test]
    fn same_day_after_cutoff_never_alerts(
        min in 0.0f64..10.0,
        span in 0.0f64..5.0,
        rating in any_rating(),
        config in any_config(),
        hour in 8u32..24,
        minute in 0u32..60,
    ) {
        let decision = evaluate(&day(0, min, min + span, rating), &config, now_at(hour, minute));
        prop_assert!(!decision.should_alert);
    }

    #[test]
    fn minimum_rating_tightens_toward_today_within_three_days(a in 0i64..=3, b in 0i64..=3) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(min_rating_for(near).rank() >= min_rating_for(far).rank());
    }

    #[test]
    fn minimum_rating_follows_tier_table(d in -30i64..60) {
        let expected = match d {
            i64::MIN..=0 => RatingKey::Good,
            1..=3 => RatingKey::Fair,
            _ => RatingKey::FairToGood,
        };
        prop_assert_eq!(min_rating_for(d), expected);
    }

    #[test]
    fn alerting_is_monotonic_in_rating(
        offset in 1i64..8,
        r1 in any_rating(),
        r2 in any_rating(),
    ) {
        // With waves in range, a better-ranked rating alerts whenever a worse one does.
        let config = AlertConfig::default();
        let (lo, hi) = if r1.rank() <= r2.rank() { (r1, r2) } else { (r2, r1) };
        let low = evaluate(&day(offset, 3.0, 4.0, lo), &config, now_at(10, 0));
        let high = evaluate(&day(offset, 3.0, 4.0, hi), &config, now_at(10, 0));
        prop_assert!(!low.should_alert || high.should_alert);
    }

    #[test]
    fn wave_gate_is_an_overlap_test(
        min in 0.0f64..12.0,
        span in 0.0f64..6.0,
        config in any_config(),
    ) {
        let max = min + span;
        let overlaps = max >= config.wave_min_ft && min <= config.wave_max_ft;
        // Epic two days out passes every other gate.
        let decision = evaluate(&day(2, min, max, RatingKey::Epic), &config, now_at(10, 0));
        prop_assert_eq!(decision.should_alert, overlaps, "reason: {}", decision.reason);
    }

    #[test]
    fn disabled_quiet_hours_never_suppress(start in 0u32..24, end in 0u32..24, hour in 0u32..24) {
        let quiet = QuietHours { enabled: false, start_hour: start, end_hour: end };
        prop_assert!(!is_suppressed(&quiet, now_at(hour, 0)));
    }

    #[test]
    fn equal_start_and_end_never_suppress(boundary in 0u32..24, hour in 0u32..24) {
        let quiet = QuietHours { enabled: true, start_hour: boundary, end_hour: boundary };
        prop_assert!(!is_suppressed(&quiet, now_at(hour, 30)));
    }

    #[test]
    fn wrapped_window_is_complement_of_unwrapped(
        start in 0u32..24,
        end in 0u32..24,
        hour in 0u32..24,
    ) {
        prop_assume!(start < end);
        let day_window = QuietHours { enabled: true, start_hour: start, end_hour: end };
        let night_window = QuietHours { enabled: true, start_hour: end, end_hour: start };
        let now = now_at(hour, 0);
        prop_assert_ne!(is_suppressed(&day_window, now), is_suppressed(&night_window, now));
    }
}
