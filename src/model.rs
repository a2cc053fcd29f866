/// Core data types for the surf alert service.
///
/// This module defines the shared domain model imported by all other modules:
/// forecast records supplied by collaborators, the decisions and alerts the
/// engine derives from them, and the error types surfaced at the I/O edges.
/// It contains no logic and no I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rating::RatingKey;

// ---------------------------------------------------------------------------
// Location types
// ---------------------------------------------------------------------------

/// A surf spot being watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Provider spot identifier; forms the first half of the dedup key.
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Forecast types
// ---------------------------------------------------------------------------

/// Wind summary for a forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    /// Provider direction label, e.g. "offshore" or "NW".
    pub direction: String,
}

/// One day of forecast for one location, in feet.
///
/// Produced by `ingest::forecast` and read-only to the engine.
/// Invariant: `wave_min_ft <= wave_max_ft` (the ingest layer reorders
/// swapped pairs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub location_id: String,
    pub date: NaiveDate,
    pub wave_min_ft: f64,
    pub wave_max_ft: f64,
    pub rating: RatingKey,
    pub wind: Option<Wind>,
}

/// All forecast days for a single location, date-ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationForecast {
    pub location: Location,
    pub days: Vec<ForecastDay>,
}

// ---------------------------------------------------------------------------
// Decision types
// ---------------------------------------------------------------------------

/// The evaluator's verdict on a single forecast day. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDecision {
    pub forecast_day: ForecastDay,
    pub should_alert: bool,
    pub reason: String,
}

/// The alert-worthy days for one location, in input (date-ascending) order.
///
/// Never constructed empty: `generate_alert` and `filter_unseen` return
/// `None` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub location: Location,
    pub days: Vec<ForecastDay>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the persisted alert state file.
///
/// Loading never produces these (a bad file degrades to an empty state);
/// only writes and lock acquisition do.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state file I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize alert state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("alert state is locked by another check cycle ({lock_path})")]
    Locked { lock_path: String },
}

/// Errors loading the service configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid TOML: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors reading a forecast document supplied by the fetch collaborator.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("could not read forecast file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("forecast document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
