/// Development mode utilities for replaying forecasts at a chosen moment
///
/// A saved forecast document is only interesting relative to the moment it
/// is evaluated at. Dev mode pins the cycle's clock to a fixed local time
/// or shifts the wall clock by whole days, so a forecast captured last week
/// can be replayed as if it were fresh.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

/// Clock override for a check cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevMode {
    /// Evaluate as if the local time were exactly this
    pub fixed_now: Option<NaiveDateTime>,
    /// Otherwise shift the wall clock back by this many days
    pub days_offset: i64,
}

/// The moment a cycle runs at: local wall-clock time for evaluation and
/// quiet hours, UTC for record timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleClock {
    pub local: NaiveDateTime,
    pub utc: DateTime<Utc>,
}

impl DevMode {
    /// Create a dev mode that replays `days_offset` days in the past
    pub fn new(days_offset: i64) -> Self {
        Self {
            fixed_now: None,
            days_offset,
        }
    }

    pub fn at(fixed_now: NaiveDateTime) -> Self {
        Self {
            fixed_now: Some(fixed_now),
            days_offset: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.fixed_now.is_some() || self.days_offset != 0
    }

    /// Resolve the cycle clock against the real current time
    pub fn now(&self) -> CycleClock {
        self.resolve(Local::now())
    }

    /// Resolve against an injected wall clock
    pub fn resolve<Tz: TimeZone>(&self, wall: DateTime<Tz>) -> CycleClock {
        match self.fixed_now {
            Some(local) => CycleClock {
                local,
                utc: local_to_utc(&wall.timezone(), local),
            },
            None => {
                let shifted = wall - Duration::days(self.days_offset);
                CycleClock {
                    local: shifted.naive_local(),
                    utc: shifted.with_timezone(&Utc),
                }
            }
        }
    }
}

/// Local wall time to UTC. DST gaps fall back to treating the time as UTC;
/// ambiguous times take the earlier instant.
fn local_to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&local),
    }
}

/// Parse a `--now` argument: `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD HH:MM`
pub fn parse_fixed_now(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn wall() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(10 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 10, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_dev_mode_creation() {
        let dev = DevMode::new(3);
        assert_eq!(dev.days_offset, 3);
        assert!(dev.fixed_now.is_none());
        assert!(dev.is_active());
        assert!(!DevMode::default().is_active());
    }

    #[test]
    fn test_inactive_mode_uses_wall_clock() {
        let clock = DevMode::default().resolve(wall());
        assert_eq!(clock.local, wall().naive_local());
        assert_eq!(clock.utc, wall().with_timezone(&Utc));
    }

    #[test]
    fn test_days_offset_shifts_back() {
        let clock = DevMode::new(2).resolve(wall());
        assert_eq!(clock.local.date(), NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
        assert_eq!(clock.utc, wall().with_timezone(&Utc) - Duration::days(2));
    }

    #[test]
    fn test_fixed_now_is_interpreted_in_wall_timezone() {
        let fixed = parse_fixed_now("2024-05-01T07:00").unwrap();
        let clock = DevMode::at(fixed).resolve(wall());
        assert_eq!(clock.local, fixed);
        // 07:00 at UTC-10 is 17:00 UTC
        assert_eq!(clock.utc, Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_fixed_now_formats() {
        assert!(parse_fixed_now("2024-05-01T07:00:30").is_some());
        assert!(parse_fixed_now("2024-05-01 07:00").is_some());
        assert!(parse_fixed_now("tomorrow morning").is_none());
    }
}
