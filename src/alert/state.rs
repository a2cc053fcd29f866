//! Persisted alert state.
//!
//! A small key-value record of which `(location, forecast date)` pairs have
//! already been reported, plus the time of the last check. On disk:
//!
//! ```json
//! { "lastCheck": "2024-05-01T12:00:00Z",
//!   "alertsSent": { "spot-1:2024-05-03": "2024-05-01T12:00:00Z" } }
//! ```
//!
//! Loading never fails: a missing or corrupt file is replaced by an empty
//! state. Writes go to a temp file in the same directory and are renamed
//! over the original, so a crash mid-write leaves the previous state intact.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::alert::stalenesses::{is_stale_key, retention_cutoff};
use crate::logging::{self, Component};
use crate::model::StateError;

/// Dedup key for a location and forecast date: `"<location>:<YYYY-MM-DD>"`.
pub fn dedup_key(location_id: &str, date: NaiveDate) -> String {
    format!("{}:{}", location_id, date.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    #[serde(rename = "lastCheck", default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<DateTime<Utc>>,
    #[serde(rename = "alertsSent", default)]
    pub alerts_sent: BTreeMap<String, DateTime<Utc>>,
}

impl AlertState {
    pub fn was_recorded(&self, location_id: &str, date: NaiveDate) -> bool {
        self.alerts_sent.contains_key(&dedup_key(location_id, date))
    }

    /// Records (or re-records) the alert for a location and date.
    pub fn record_sent(&mut self, location_id: &str, date: NaiveDate, at: DateTime<Utc>) {
        self.alerts_sent.insert(dedup_key(location_id, date), at);
    }

    /// Drops records whose forecast date is strictly older than
    /// `now - retention_days`. Returns how many were removed.
    pub fn prune_older_than(&mut self, now: DateTime<Utc>, retention_days: u32) -> usize {
        let cutoff = retention_cutoff(now, retention_days);
        let before = self.alerts_sent.len();
        self.alerts_sent.retain(|key, _| !is_stale_key(key, &cutoff));
        before - self.alerts_sent.len()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// File-backed home of an `AlertState`.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the state file, falling back to an empty state if it is
    /// missing, unreadable, or not valid state JSON.
    pub fn load(&self) -> AlertState {
        let display = self.path.display().to_string();

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                logging::debug(
                    Component::State,
                    None,
                    &format!("No state file at {}, starting fresh", display),
                );
                return AlertState::default();
            }
            Err(e) => {
                logging::warn(
                    Component::State,
                    None,
                    &format!("Could not read state file {}: {}; starting fresh", display, e),
                );
                return AlertState::default();
            }
        };

        match serde_json::from_str::<AlertState>(&text) {
            Ok(state) => {
                logging::debug(
                    Component::State,
                    None,
                    &format!("Loaded {} alert records from {}", state.alerts_sent.len(), display),
                );
                state
            }
            Err(e) => {
                logging::warn(
                    Component::State,
                    None,
                    &format!("State file {} is corrupt ({}); starting fresh", display, e),
                );
                AlertState::default()
            }
        }
    }

    /// Atomically replaces the state file with `state`.
    pub fn persist(&self, state: &AlertState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;
        let dir = self.directory();

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(json.as_bytes()).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        logging::debug(
            Component::State,
            None,
            &format!(
                "Persisted {} alert records to {}",
                state.alerts_sent.len(),
                self.path.display()
            ),
        );
        Ok(())
    }

    /// Opens (creating if needed) the cycle lock file `<state file>.lock`.
    /// Nothing is held until `StateLock::try_hold`.
    pub fn lock_file(&self) -> Result<StateLock, StateError> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StateError::Io {
                path: lock_path.display().to_string(),
                source: e,
            })?;
        Ok(StateLock {
            lock: RwLock::new(file),
            path: lock_path,
        })
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Advisory lock on a state file for the duration of a check cycle.
///
/// The kernel drops the lock when the holding process exits, so a lock
/// file left behind by a crashed cycle does not block the next one.
#[derive(Debug)]
pub struct StateLock {
    lock: RwLock<File>,
    path: PathBuf,
}

impl StateLock {
    /// Takes the lock without waiting. Fails with `StateError::Locked`
    /// while another cycle holds it; released when the guard drops.
    pub fn try_hold(&mut self) -> Result<RwLockWriteGuard<'_, File>, StateError> {
        match self.lock.try_write() {
            Ok(guard) => Ok(guard),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Err(StateError::Locked {
                lock_path: self.path.display().to_string(),
            }),
            Err(e) => Err(StateError::Io {
                path: self.path.display().to_string(),
                source: e,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 13, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- in-memory operations -----------------------------------------------

    #[test]
    fn test_dedup_key_format() {
        assert_eq!(dedup_key("spot-1", date(2024, 5, 3)), "spot-1:2024-05-03");
    }

    #[test]
    fn test_record_then_was_recorded() {
        let mut state = AlertState::default();
        assert!(!state.was_recorded("spot-1", date(2024, 5, 11)));

        state.record_sent("spot-1", date(2024, 5, 11), fixed_now());
        assert!(state.was_recorded("spot-1", date(2024, 5, 11)));
        assert!(!state.was_recorded("spot-2", date(2024, 5, 11)));
        assert!(!state.was_recorded("spot-1", date(2024, 5, 12)));
    }

    #[test]
    fn test_record_sent_is_an_upsert() {
        let mut state = AlertState::default();
        let later = fixed_now() + chrono::Duration::hours(3);
        state.record_sent("spot-1", date(2024, 5, 11), fixed_now());
        state.record_sent("spot-1", date(2024, 5, 11), later);
        assert_eq!(state.alerts_sent.len(), 1);
        assert_eq!(state.alerts_sent["spot-1:2024-05-11"], later);
    }

    #[test]
    fn test_prune_removes_only_records_past_retention() {
        let mut state = AlertState::default();
        state.record_sent("spot-1", date(2024, 5, 2), fixed_now()); // 8 days before
        state.record_sent("spot-1", date(2024, 5, 4), fixed_now()); // 6 days before
        state.record_sent("spot-2", date(2024, 5, 12), fixed_now());

        let removed = state.prune_older_than(fixed_now(), 7);

        assert_eq!(removed, 1);
        assert!(!state.was_recorded("spot-1", date(2024, 5, 2)));
        assert!(state.was_recorded("spot-1", date(2024, 5, 4)));
        assert!(state.was_recorded("spot-2", date(2024, 5, 12)));
    }

    #[test]
    fn test_prune_uses_forecast_date_not_record_time() {
        let mut state = AlertState::default();
        let long_ago = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        state.record_sent("spot-1", date(2024, 5, 9), long_ago);
        assert_eq!(state.prune_older_than(fixed_now(), 7), 0);
    }

    // --- on-disk format -----------------------------------------------------

    #[test]
    fn test_parses_existing_state_document() {
        let json = r#"{
            "lastCheck": "2024-05-01T12:00:00.000Z",
            "alertsSent": { "spot-1:2024-05-03": "2024-05-01T12:00:00.000Z" }
        }"#;
        let state: AlertState = serde_json::from_str(json).expect("state should parse");
        assert_eq!(state.last_check, Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
        assert!(state.was_recorded("spot-1", date(2024, 5, 3)));
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let mut state = AlertState {
            last_check: Some(fixed_now()),
            ..AlertState::default()
        };
        state.record_sent("spot-1", date(2024, 5, 11), fixed_now());
        let value = serde_json::to_value(&state).unwrap();
        assert!(value.get("lastCheck").is_some());
        assert!(value["alertsSent"].get("spot-1:2024-05-11").is_some());
    }

    // --- store --------------------------------------------------------------

    #[test]
    fn test_load_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), AlertState::default());
    }

    #[test]
    fn test_load_corrupt_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(StateStore::new(&path).load(), AlertState::default());
    }

    #[test]
    fn test_persist_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let mut state = AlertState {
            last_check: Some(fixed_now()),
            ..AlertState::default()
        };
        state.record_sent("spot-1", date(2024, 5, 11), fixed_now());

        store.persist(&state).expect("persist should succeed");
        assert_eq!(store.load(), state);
    }

    #[test]
    fn test_persist_leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        store.persist(&AlertState::default()).unwrap();
        store.persist(&AlertState::default()).unwrap();
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_second_hold_is_refused_until_first_drops() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let mut first = store.lock_file().unwrap();
        let mut second = store.lock_file().unwrap();

        let guard = first.try_hold().expect("first hold should succeed");
        assert!(matches!(second.try_hold(), Err(StateError::Locked { .. })));

        drop(guard);
        assert!(second.try_hold().is_ok(), "lock should be free after guard drops");
    }

    #[test]
    fn test_leftover_lock_file_without_holder_is_free() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        fs::write(dir.path().join("state.json.lock"), "99999\n").unwrap();

        let mut lock = store.lock_file().unwrap();
        assert!(lock.try_hold().is_ok());
    }
}
