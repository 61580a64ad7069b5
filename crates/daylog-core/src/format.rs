//! Wall-clock and duration rendering.

use std::fmt;

use chrono::{DateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Serialize, Serializer};

/// A time of day in the reporting timezone, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// The wall-clock time of `instant` as seen from `tz`.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        Self(instant.with_timezone(tz).time())
    }

    #[must_use]
    pub const fn naive(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Estimated active time in whole minutes.
///
/// Renders as `45m`, `2h` or `2h 5m`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActiveDuration(i64);

impl ActiveDuration {
    /// Negative inputs are treated as zero.
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        if minutes < 0 { Self(0) } else { Self(minutes) }
    }

    #[must_use]
    pub const fn minutes(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ActiveDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 60;
        let minutes = self.0 % 60;
        match (hours, minutes) {
            (0, m) => write!(f, "{m}m"),
            (h, 0) => write!(f, "{h}h"),
            (h, m) => write!(f, "{h}h {m}m"),
        }
    }
}

impl Serialize for ActiveDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl std::iter::Sum for ActiveDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|d| d.0).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    use crate::types::parse_timestamp;

    #[test]
    fn test_duration_minutes_only() {
        assert_eq!(ActiveDuration::from_minutes(0).to_string(), "0m");
        assert_eq!(ActiveDuration::from_minutes(1).to_string(), "1m");
        assert_eq!(ActiveDuration::from_minutes(59).to_string(), "59m");
    }

    #[test]
    fn test_duration_whole_hours_drop_minutes() {
        assert_eq!(ActiveDuration::from_minutes(60).to_string(), "1h");
        assert_eq!(ActiveDuration::from_minutes(180).to_string(), "3h");
    }

    #[test]
    fn test_duration_hours_and_minutes() {
        assert_eq!(ActiveDuration::from_minutes(61).to_string(), "1h 1m");
        assert_eq!(ActiveDuration::from_minutes(150).to_string(), "2h 30m");
    }

    #[test]
    fn test_duration_negative_is_zero() {
        assert_eq!(ActiveDuration::from_minutes(-5).minutes(), 0);
    }

    #[test]
    fn test_duration_sum() {
        let total: ActiveDuration = [30, 45, 5]
            .into_iter()
            .map(ActiveDuration::from_minutes)
            .sum();
        assert_eq!(total.to_string(), "1h 20m");
    }

    #[test]
    fn test_clock_time_uses_timezone() {
        let instant = parse_timestamp("2025-01-15T08:05:59Z").unwrap();
        assert_eq!(ClockTime::of(&instant, &Utc).to_string(), "08:05");

        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(ClockTime::of(&instant, &new_york).to_string(), "03:05");
    }

    #[test]
    fn test_serializes_as_rendered_strings() {
        let instant = parse_timestamp("2025-01-15T21:40:00Z").unwrap();
        let json = serde_json::to_string(&(
            ClockTime::of(&instant, &Utc),
            ActiveDuration::from_minutes(125),
        ))
        .unwrap();
        assert_eq!(json, r#"["21:40","2h 5m"]"#);
    }
}
