//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value is not a calendar date in the expected shape.
    #[error("invalid date: {value} (expected {expected})")]
    InvalidDate {
        value: String,
        expected: &'static str,
    },

    /// The value is not an RFC 3339 timestamp.
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    /// The value is not a known IANA timezone name.
    #[error("unknown timezone: {value}")]
    InvalidTimeZone { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated conversation session identifier.
    ///
    /// Session IDs must be non-blank. Transcripts without one get the
    /// file stem assigned by the loader before reaching aggregation.
    SessionId, "session ID"
);

const ISO_DATE: &str = "YYYY-MM-DD";
const COMPACT_DATE: &str = "YYYYMMDD";

/// A calendar date in the reporting timezone.
///
/// Always rendered as fixed-width `YYYY-MM-DD`, so string order and
/// chronological order agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalDate(NaiveDate);

impl LocalDate {
    #[must_use]
    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses a `YYYY-MM-DD` date.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return Err(invalid_date(s, ISO_DATE));
        }
        from_parts(s, &s[0..4], &s[5..7], &s[8..10], ISO_DATE)
    }

    /// Parses a compact `YYYYMMDD` date, the form used by `--since`/`--until`.
    pub fn parse_compact(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "date" });
        }
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_date(s, COMPACT_DATE));
        }
        from_parts(s, &s[0..4], &s[4..6], &s[6..8], COMPACT_DATE)
    }

    /// The calendar date of `instant` as seen from `tz`.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        Self(instant.with_timezone(tz).date_naive())
    }

    #[must_use]
    pub const fn naive(self) -> NaiveDate {
        self.0
    }
}

fn invalid_date(value: &str, expected: &'static str) -> ValidationError {
    ValidationError::InvalidDate {
        value: value.to_string(),
        expected,
    }
}

fn from_parts(
    value: &str,
    year: &str,
    month: &str,
    day: &str,
    expected: &'static str,
) -> Result<LocalDate, ValidationError> {
    let parsed = (
        year.parse::<i32>(),
        month.parse::<u32>(),
        day.parse::<u32>(),
    );
    let (Ok(year), Ok(month), Ok(day)) = parsed else {
        return Err(invalid_date(value, expected));
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .map(LocalDate)
        .ok_or_else(|| invalid_date(value, expected))
}

impl fmt::Display for LocalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for LocalDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocalDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LocalDate> for String {
    fn from(date: LocalDate) -> Self {
        date.to_string()
    }
}

/// Parses an RFC 3339 timestamp into a UTC instant.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            value: s.to_string(),
        })
}

/// Parses an IANA timezone name such as `Europe/Berlin`.
pub fn parse_time_zone(name: &str) -> Result<chrono_tz::Tz, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field: "timezone" });
    }
    name.parse()
        .map_err(|_| ValidationError::InvalidTimeZone {
            value: name.to_string(),
        })
}
