//! Service configuration.
//!
//! `AlertConfig` is the value threaded into every evaluation call; the engine
//! never reads configuration from anywhere else. `ServiceConfig` wraps it with
//! the process-level settings (state file, logging, watched locations) and is
//! loaded once at startup from a TOML file plus environment overrides.

use dotenv::dotenv;
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::model::{ConfigError, Location};

pub const DEFAULT_CONFIG_PATH: &str = "surfmon.toml";
pub const DEFAULT_STATE_FILE: &str = "alert-state.json";

// ---------------------------------------------------------------------------
// Alert thresholds
// ---------------------------------------------------------------------------

/// Hour-of-day window during which alert delivery is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuietHours {
    pub enabled: bool,
    /// Inclusive start hour, 0–23.
    pub start_hour: u32,
    /// Exclusive end hour, 0–23.
    pub end_hour: u32,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: 22,
            end_hour: 6,
        }
    }
}

/// Thresholds for a single evaluation.
///
/// Callers are responsible for sane values; the evaluator does not validate.
/// See `sanity_warnings` for a non-fatal check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Smallest acceptable wave height, feet (inclusive).
    pub wave_min_ft: f64,
    /// Largest acceptable wave height, feet (inclusive).
    pub wave_max_ft: f64,
    /// How many days past today to consider.
    pub forecast_window_days: u32,
    pub quiet_hours: QuietHours,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            wave_min_ft: 2.0,
            wave_max_ft: 6.0,
            forecast_window_days: 7,
            quiet_hours: QuietHours::default(),
        }
    }
}

impl AlertConfig {
    /// Describes values the engine will accept but that are probably
    /// mistakes. Empty when the config looks sane.
    pub fn sanity_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.wave_min_ft > self.wave_max_ft {
            warnings.push(format!(
                "wave_min_ft ({}) is greater than wave_max_ft ({}); no day can match",
                self.wave_min_ft, self.wave_max_ft
            ));
        }
        if self.quiet_hours.start_hour > 23 {
            warnings.push(format!(
                "quiet_hours.start_hour {} is outside 0-23",
                self.quiet_hours.start_hour
            ));
        }
        if self.quiet_hours.end_hour > 23 {
            warnings.push(format!(
                "quiet_hours.end_hour {} is outside 0-23",
                self.quiet_hours.end_hour
            ));
        }
        warnings
    }
}

// ---------------------------------------------------------------------------
// Service configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub state_file: String,
    pub log_level: String,
    pub log_file: Option<String>,
    pub forecast_file: Option<String>,
    pub alert: AlertConfig,
    pub locations: Vec<Location>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            state_file: DEFAULT_STATE_FILE.to_string(),
            log_level: "info".to_string(),
            log_file: None,
            forecast_file: None,
            alert: AlertConfig::default(),
            locations: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from `path` (or `SURFMON_CONFIG`, or
    /// `surfmon.toml`), then applies environment overrides.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an
    /// error.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv().ok();

        let path = path
            .map(String::from)
            .or_else(|| env::var("SURFMON_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `SURFMON_*` overrides. The lookup is injected so tests need
    /// not touch the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(state_file) = lookup("SURFMON_STATE_FILE") {
            self.state_file = state_file;
        }
        if let Some(level) = lookup("SURFMON_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(log_file) = lookup("SURFMON_LOG_FILE") {
            self.log_file = Some(log_file);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
