//! One check cycle: load state, evaluate, dedup, gate, commit.
//!
//! Evaluation always runs. Quiet hours only decide whether the new alerts
//! are delivered now or withheld; withheld alerts are not recorded, so the
//! next non-quiet cycle reports them.

use crate::alert::dedup::{commit_cycle, filter_unseen};
use crate::alert::evaluate::{alert_from_decisions, evaluate_all};
use crate::alert::quiet_hours::is_suppressed;
use crate::alert::state::StateStore;
use crate::config::AlertConfig;
use crate::dev_mode::CycleClock;
use crate::logging::{self, Component};
use crate::model::{Alert, AlertDecision, Location, LocationForecast, StateError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOptions {
    /// Evaluate and report without locking or writing the state file.
    pub dry_run: bool,
}

/// Decisions for every in-window day of one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationEvaluation {
    pub location: Location,
    pub decisions: Vec<AlertDecision>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub evaluations: Vec<LocationEvaluation>,
    /// Unseen alerts released for delivery (and recorded as sent).
    pub new_alerts: Vec<Alert>,
    /// Unseen alerts held back by quiet hours (not recorded).
    pub withheld_alerts: Vec<Alert>,
    pub suppressed: bool,
    pub persisted: bool,
}

impl CycleOutcome {
    pub fn evaluated_days(&self) -> usize {
        self.evaluations.iter().map(|e| e.decisions.len()).sum()
    }
}

pub fn run_cycle(
    forecasts: &[LocationForecast],
    config: &AlertConfig,
    store: &StateStore,
    clock: CycleClock,
    options: CycleOptions,
) -> Result<CycleOutcome, StateError> {
    let mut lock = if options.dry_run { None } else { Some(store.lock_file()?) };
    let _held = match lock.as_mut() {
        Some(lock) => Some(lock.try_hold()?),
        None => None,
    };
    let mut state = store.load();

    let mut evaluations = Vec::with_capacity(forecasts.len());
    let mut unseen = Vec::new();

    for forecast in forecasts {
        let decisions = evaluate_all(&forecast.days, config, clock.local);
        for decision in &decisions {
            logging::debug(
                Component::Evaluator,
                Some(&forecast.location.id),
                &format!(
                    "{} alert={} ({})",
                    decision.forecast_day.date, decision.should_alert, decision.reason
                ),
            );
        }

        if let Some(alert) = alert_from_decisions(&forecast.location, &decisions) {
            if let Some(fresh) = filter_unseen(&alert, &state) {
                unseen.push(fresh);
            }
        }

        evaluations.push(LocationEvaluation {
            location: forecast.location.clone(),
            decisions,
        });
    }

    let suppressed = is_suppressed(&config.quiet_hours, clock.local);
    let (new_alerts, withheld_alerts) = if suppressed {
        if !unseen.is_empty() {
            logging::info(
                Component::QuietHours,
                None,
                &format!("Quiet hours: holding {} alerts for the next cycle", unseen.len()),
            );
        }
        (Vec::new(), unseen)
    } else {
        (unseen, Vec::new())
    };

    let persisted = if options.dry_run {
        false
    } else {
        commit_cycle(store, &mut state, &new_alerts, clock.utc)?;
        true
    };

    let outcome = CycleOutcome {
        evaluations,
        new_alerts,
        withheld_alerts,
        suppressed,
        persisted,
    };

    logging::log_cycle_summary(
        outcome.evaluated_days(),
        outcome.new_alerts.len(),
        outcome.withheld_alerts.len(),
    );

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
