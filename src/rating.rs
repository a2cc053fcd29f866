/// Surf quality rating scale.
///
/// Forecast providers report a qualitative rating per day. Several adjacent
/// ratings share a rank (e.g. "Good to Epic" and "Epic"), so ranks come
/// from an explicit registry table rather than from enum order. Adding a
/// rating is a one-row edit to `RATING_SCALE`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Rating keys
// ---------------------------------------------------------------------------

/// Qualitative surf conditions as reported by the forecast collaborator.
///
/// Wire form is SCREAMING_SNAKE_CASE (`"FAIR_TO_GOOD"`). Anything not on
/// the scale deserializes to `Unknown`, which ranks lowest so an unexpected
/// key can never trigger an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingKey {
    Flat,
    VeryPoor,
    Poor,
    PoorToFair,
    Fair,
    FairToGood,
    Good,
    GoodToEpic,
    Epic,
    #[serde(other)]
    Unknown,
}

impl RatingKey {
    /// Numeric rank used for threshold comparisons (0–5).
    pub fn rank(self) -> u8 {
        rank_of(self)
    }

    /// Human-readable name, e.g. "Fair to Good".
    pub fn display_name(self) -> &'static str {
        display_name(self)
    }
}

impl fmt::Display for RatingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One row of the rating scale.
pub struct RatingEntry {
    pub key: RatingKey,
    /// Provider wire key.
    pub wire_key: &'static str,
    pub display_name: &'static str,
    pub rank: u8,
}

/// The complete rating scale in ascending order. Ties are intentional:
/// providers distinguish shades of quality that alerting treats as equal.
pub static RATING_SCALE: &[RatingEntry] = &[
    RatingEntry {
        key: RatingKey::Flat,
        wire_key: "FLAT",
        display_name: "Flat",
        rank: 0,
    },
    RatingEntry {
        key: RatingKey::VeryPoor,
        wire_key: "VERY_POOR",
        display_name: "Very Poor",
        rank: 0,
    },
    RatingEntry {
        key: RatingKey::Poor,
        wire_key: "POOR",
        display_name: "Poor",
        rank: 1,
    },
    RatingEntry {
        key: RatingKey::PoorToFair,
        wire_key: "POOR_TO_FAIR",
        display_name: "Poor to Fair",
        rank: 1,
    },
    RatingEntry {
        key: RatingKey::Fair,
        wire_key: "FAIR",
        display_name: "Fair",
        rank: 2,
    },
    RatingEntry {
        key: RatingKey::FairToGood,
        wire_key: "FAIR_TO_GOOD",
        display_name: "Fair to Good",
        rank: 3,
    },
    RatingEntry {
        key: RatingKey::Good,
        wire_key: "GOOD",
        display_name: "Good",
        rank: 4,
    },
    RatingEntry {
        key: RatingKey::GoodToEpic,
        wire_key: "GOOD_TO_EPIC",
        display_name: "Good to Epic",
        rank: 5,
    },
    RatingEntry {
        key: RatingKey::Epic,
        wire_key: "EPIC",
        display_name: "Epic",
        rank: 5,
    },
];

/// Looks up the registry row for a key. `Unknown` has no row.
pub fn find_rating(key: RatingKey) -> Option<&'static RatingEntry> {
    RATING_SCALE.iter().find(|e| e.key == key)
}

/// Rank of a rating; keys missing from the scale rank 0.
pub fn rank_of(key: RatingKey) -> u8 {
    find_rating(key).map(|e| e.rank).unwrap_or(0)
}

pub fn display_name(key: RatingKey) -> &'static str {
    find_rating(key).map(|e| e.display_name).unwrap_or("Unknown")
}

/// Parses a provider wire key (case-insensitive). Returns `Unknown` rather
/// than failing for keys not on the scale.
pub fn from_key(wire_key: &str) -> RatingKey {
    let trimmed = wire_key.trim();
    RATING_SCALE
        .iter()
        .find(|e| e.wire_key.eq_ignore_ascii_case(trimmed))
        .map(|e| e.key)
        .unwrap_or(RatingKey::Unknown)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
