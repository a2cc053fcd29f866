//! Cycle Report
//!
//! Caller-facing rendering of a check cycle. The engine only decides; this
//! module shapes those decisions for whoever invoked the cycle:
//!
//! - `cron`:  silent unless there are new alerts to deliver
//! - `debug`: every evaluated day with its decision and reason
//! - `json`:  the full report, serialized verbatim

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write as _;

use crate::alert::evaluate::describe_days_out;
use crate::alert::thresholds::days_out;
use crate::cycle::CycleOutcome;
use crate::dev_mode::CycleClock;
use crate::model::{Alert, AlertDecision, ForecastDay};

// ============================================================================
// Output Modes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    /// Silent unless there are new alerts (default)
    #[default]
    Cron,
    /// Every evaluated day with its decision
    Debug,
    /// The full report as JSON
    Json,
}

// ============================================================================
// Report Structures
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub timestamp: String,
    pub local_time: String,
    pub quiet_hours_active: bool,
    pub locations: Vec<LocationReport>,
    pub new_alerts: Vec<Alert>,
    pub withheld_alerts: Vec<Alert>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub location_id: String,
    pub name: String,
    pub decisions: Vec<AlertDecision>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub locations_checked: usize,
    pub days_evaluated: usize,
    pub days_alerting: usize,
    pub new_alert_days: usize,
    pub withheld_alert_days: usize,
    pub state_persisted: bool,
}

impl CycleReport {
    pub fn from_outcome(outcome: &CycleOutcome, clock: CycleClock) -> Self {
        let locations: Vec<LocationReport> = outcome
            .evaluations
            .iter()
            .map(|e| LocationReport {
                location_id: e.location.id.clone(),
                name: e.location.name.clone(),
                decisions: e.decisions.clone(),
            })
            .collect();

        let days_alerting = locations
            .iter()
            .flat_map(|l| l.decisions.iter())
            .filter(|d| d.should_alert)
            .count();

        let summary = ReportSummary {
            locations_checked: locations.len(),
            days_evaluated: outcome.evaluated_days(),
            days_alerting,
            new_alert_days: count_days(&outcome.new_alerts),
            withheld_alert_days: count_days(&outcome.withheld_alerts),
            state_persisted: outcome.persisted,
        };

        CycleReport {
            timestamp: clock.utc.to_rfc3339(),
            local_time: clock.local.format("%Y-%m-%d %H:%M").to_string(),
            quiet_hours_active: outcome.suppressed,
            locations,
            new_alerts: outcome.new_alerts.clone(),
            withheld_alerts: outcome.withheld_alerts.clone(),
            summary,
        }
    }

    /// Renders the report for `mode`. `None` means print nothing.
    pub fn render(
        &self,
        mode: OutputMode,
        clock: CycleClock,
    ) -> Result<Option<String>, serde_json::Error> {
        match mode {
            OutputMode::Cron => Ok(self.render_cron(clock)),
            OutputMode::Debug => Ok(Some(self.render_debug(clock))),
            OutputMode::Json => serde_json::to_string_pretty(self).map(Some),
        }
    }

    fn render_cron(&self, clock: CycleClock) -> Option<String> {
        if self.new_alerts.is_empty() {
            return None;
        }
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Surf alert: {} new day(s) at {} location(s)",
            self.summary.new_alert_days,
            self.new_alerts.len()
        );
        for alert in &self.new_alerts {
            let _ = writeln!(out, "\n{}", alert.location.name);
            for day in &alert.days {
                let _ = writeln!(out, "  {}", day_line(day, clock));
            }
        }
        Some(out)
    }

    fn render_debug(&self, clock: CycleClock) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Check at {} (local)", self.local_time);
        let _ = writeln!(
            out,
            "Quiet hours: {}",
            if self.quiet_hours_active { "active, delivery withheld" } else { "inactive" }
        );

        for location in &self.locations {
            let _ = writeln!(out, "\n{} ({})", location.name, location.location_id);
            if location.decisions.is_empty() {
                let _ = writeln!(out, "  no forecast days in window");
            }
            for decision in &location.decisions {
                let mark = if decision.should_alert { "ALERT" } else { "  -  " };
                let _ = writeln!(
                    out,
                    "  [{}] {} -> {}",
                    mark,
                    day_line(&decision.forecast_day, clock),
                    decision.reason
                );
            }
        }

        let s = &self.summary;
        let _ = writeln!(
            out,
            "\n{} days evaluated across {} locations: {} alerting, {} new, {} withheld{}",
            s.days_evaluated,
            s.locations_checked,
            s.days_alerting,
            s.new_alert_days,
            s.withheld_alert_days,
            if s.state_persisted { "" } else { " (state not saved)" }
        );
        out
    }
}

fn count_days(alerts: &[Alert]) -> usize {
    alerts.iter().map(|a| a.days.len()).sum()
}

fn day_line(day: &ForecastDay, clock: CycleClock) -> String {
    let wind = day
        .wind
        .as_ref()
        .map(|w| format!(", wind {} {}", w.speed, w.direction))
        .unwrap_or_default();
    format!(
        "{} ({}): {}-{}ft {}{}",
        day.date.format("%a %b %-d"),
        describe_days_out(days_out(day.date, clock.local)),
        day.wave_min_ft,
        day.wave_max_ft,
        day.rating,
        wind
    )
}

// ============================================================================
// Tests
// ============================================================================
