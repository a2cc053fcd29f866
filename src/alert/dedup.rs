//! Alert deduplication and end-of-cycle state commit.
//!
//! `commit_cycle` is the only code path that mutates the alert state, so a
//! location/date pair is reported at most once.

use chrono::{DateTime, Utc};

use crate::alert::stalenesses::DEFAULT_RETENTION_DAYS;
use crate::alert::state::{AlertState, StateStore};
use crate::logging::{self, Component};
use crate::model::{Alert, StateError};

/// Keeps only the alert's days not yet recorded for its location.
/// Returns `None` when every day has already been reported.
pub fn filter_unseen(alert: &Alert, state: &AlertState) -> Option<Alert> {
    let unseen: Vec<_> = alert
        .days
        .iter()
        .filter(|day| !state.was_recorded(&alert.location.id, day.date))
        .cloned()
        .collect();

    if unseen.is_empty() {
        logging::debug(
            Component::State,
            Some(&alert.location.id),
            "All alerting days already reported",
        );
        None
    } else {
        Some(Alert {
            location: alert.location.clone(),
            days: unseen,
        })
    }
}

/// Applies a finished cycle to `state` in memory: stamps `last_check`,
/// records every sent day, and prunes records past retention.
pub fn apply_cycle(state: &mut AlertState, sent: &[Alert], now: DateTime<Utc>) {
    state.last_check = Some(now);

    for alert in sent {
        for day in &alert.days {
            state.record_sent(&alert.location.id, day.date, now);
        }
    }

    let pruned = state.prune_older_than(now, DEFAULT_RETENTION_DAYS);
    if pruned > 0 {
        logging::debug(
            Component::State,
            None,
            &format!("Pruned {} expired alert records", pruned),
        );
    }
}

/// `apply_cycle` followed by an atomic persist.
pub fn commit_cycle(
    store: &StateStore,
    state: &mut AlertState,
    sent: &[Alert],
    now: DateTime<Utc>,
) -> Result<(), StateError> {
    apply_cycle(state, sent, now);
    store.persist(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForecastDay, Location};
    use crate::rating::RatingKey;
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn day(d: u32) -> ForecastDay {
        ForecastDay {
            location_id: "spot-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            wave_min_ft: 2.0,
            wave_max_ft: 4.0,
            rating: RatingKey::Good,
            wind: None,
        }
    }

    fn alert(days: Vec<ForecastDay>) -> Alert {
        Alert {
            location: Location {
                id: "spot-1".to_string(),
                name: "Test Reef".to_string(),
            },
            days,
        }
    }

    #[test]
    fn test_filter_unseen_passes_everything_on_empty_state() {
        let a = alert(vec![day(2), day(3)]);
        assert_eq!(filter_unseen(&a, &AlertState::default()), Some(a));
    }

    #[test]
    fn test_filter_unseen_drops_recorded_days_and_keeps_order() {
        let mut state = AlertState::default();
        state.record_sent("spot-1", day(3).date, fixed_now());

        let filtered = filter_unseen(&alert(vec![day(2), day(3), day(4)]), &state).unwrap();
        let dates: Vec<_> = filtered.days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day(2).date, day(4).date]);
    }

    #[test]
    fn test_records_are_per_location() {
        let mut state = AlertState::default();
        state.record_sent("other-spot", day(2).date, fixed_now());
        assert!(filter_unseen(&alert(vec![day(2)]), &state).is_some());
    }

    #[test]
    fn test_second_pass_after_commit_is_none() {
        let a = alert(vec![day(2), day(3)]);
        let mut state = AlertState::default();

        let first = filter_unseen(&a, &state).expect("first pass reports");
        apply_cycle(&mut state, &[first], fixed_now());

        assert!(filter_unseen(&a, &state).is_none());
    }

    #[test]
    fn test_apply_cycle_stamps_last_check_and_prunes() {
        let mut state = AlertState::default();
        state.record_sent("spot-1", NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(), fixed_now());

        apply_cycle(&mut state, &[], fixed_now());

        assert_eq!(state.last_check, Some(fixed_now()));
        assert!(state.alerts_sent.is_empty());
    }

    #[test]
    fn test_commit_cycle_persists() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let mut state = store.load();

        commit_cycle(&store, &mut state, &[alert(vec![day(2)])], fixed_now()).unwrap();

        let reloaded = store.load();
        assert!(reloaded.was_recorded("spot-1", day(2).date));
        assert_eq!(reloaded.last_check, Some(fixed_now()));
    }
}
