/// Forecast document reader
///
/// The fetch collaborator (outside this crate) writes the provider's daily
/// forecast for each watched spot into a JSON document. This module turns
/// that document into `LocationForecast` records for the evaluator.
///
/// Defective days are repaired or dropped here, never passed on as errors:
/// a missing date drops the day, missing heights become 0 ft, swapped
/// heights are reordered, and a missing rating becomes `Unknown`.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

use crate::logging::{self, Component};
use crate::model::{ForecastDay, IngestError, Location, LocationForecast, Wind};
use crate::rating::{self, RatingKey};

// ============================================================================
// Document Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastDocument {
    #[serde(default)]
    pub locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
pub struct RawLocation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub days: Vec<RawDay>,
}

/// One provider day. Every field is optional so one bad day cannot reject
/// the whole document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDay {
    pub date: Option<String>,
    pub wave_min: Option<f64>,
    pub wave_max: Option<f64>,
    pub rating: Option<String>,
    pub wind: Option<RawWind>,
}

#[derive(Debug, Deserialize)]
pub struct RawWind {
    pub speed: Option<f64>,
    pub direction: Option<String>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Reads and converts a forecast document from disk.
pub fn load_forecast_file(path: &Path) -> Result<Vec<LocationForecast>, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_forecast_document(&text)
}

/// Parses a forecast document. Only malformed JSON is an error.
pub fn parse_forecast_document(json: &str) -> Result<Vec<LocationForecast>, IngestError> {
    let document: ForecastDocument = serde_json::from_str(json)?;
    Ok(document.locations.into_iter().map(convert_location).collect())
}

fn convert_location(raw: RawLocation) -> LocationForecast {
    let location = Location {
        name: raw.name.unwrap_or_else(|| raw.id.clone()),
        id: raw.id,
    };

    let mut days: Vec<ForecastDay> = raw
        .days
        .into_iter()
        .filter_map(|day| convert_day(&location.id, day))
        .collect();
    days.sort_by_key(|d| d.date);

    logging::debug(
        Component::Ingest,
        Some(&location.id),
        &format!("Parsed {} forecast days for {}", days.len(), location.name),
    );

    LocationForecast { location, days }
}

fn convert_day(location_id: &str, raw: RawDay) -> Option<ForecastDay> {
    let date_text = match raw.date {
        Some(d) => d,
        None => {
            logging::warn(
                Component::Ingest,
                Some(location_id),
                "Dropping forecast day with no date",
            );
            return None;
        }
    };

    let date = match parse_day_date(&date_text) {
        Some(d) => d,
        None => {
            logging::warn(
                Component::Ingest,
                Some(location_id),
                &format!("Dropping forecast day with unparseable date '{}'", date_text),
            );
            return None;
        }
    };

    let a = raw.wave_min.filter(|v| v.is_finite()).unwrap_or(0.0);
    let b = raw.wave_max.filter(|v| v.is_finite()).unwrap_or(0.0);
    let (wave_min_ft, wave_max_ft) = if a <= b { (a, b) } else { (b, a) };

    let rating = raw
        .rating
        .as_deref()
        .map(rating::from_key)
        .unwrap_or(RatingKey::Unknown);
    if rating == RatingKey::Unknown {
        logging::debug(
            Component::Ingest,
            Some(location_id),
            &format!("Unrecognized rating {:?} on {}; treated as lowest", raw.rating, date),
        );
    }

    let wind = raw.wind.map(|w| Wind {
        speed: w.speed.unwrap_or(0.0),
        direction: w.direction.unwrap_or_default(),
    });

    Some(ForecastDay {
        location_id: location_id.to_string(),
        date,
        wave_min_ft,
        wave_max_ft,
        rating,
        wind,
    })
}

/// Accepts a plain `YYYY-MM-DD` or an ISO 8601 timestamp, keeping only the
/// calendar date as written (no timezone conversion).
fn parse_day_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// ============================================================================
// Tests
// ============================================================================
