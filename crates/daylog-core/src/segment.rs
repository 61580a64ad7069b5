//! Active session segmentation.
//!
//! Splits a time-ordered run of message timestamps into contiguous
//! "active sessions": consecutive messages no more than the gap threshold
//! apart belong to the same session.
//!
//! # Duration Policy
//!
//! Each session counts `max(1, floor(end - start))` whole minutes, so a
//! session made of a single message still contributes one minute.

use chrono::{DateTime, Utc};

use crate::format::ActiveDuration;

/// Default inactivity gap: 3 minutes.
pub const DEFAULT_GAP_THRESHOLD_MS: i64 = 180_000;

/// Configuration for session segmentation.
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Maximum gap between consecutive messages of one session, inclusive.
    /// Default: 180000 (3 minutes).
    pub gap_threshold_ms: i64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            gap_threshold_ms: DEFAULT_GAP_THRESHOLD_MS,
        }
    }
}

/// A contiguous run of activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ActiveSession {
    const fn at(instant: DateTime<Utc>) -> Self {
        Self {
            start: instant,
            end: instant,
        }
    }

    /// Elapsed whole minutes, never less than one.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(1)
    }
}

/// Segment sorted timestamps into active sessions.
///
/// `timestamps` must be non-empty and sorted ascending; violating either is
/// a caller bug and panics.
pub fn segment(timestamps: &[DateTime<Utc>], config: &SegmentConfig) -> Vec<ActiveSession> {
    let Some((&first, rest)) = timestamps.split_first() else {
        panic!("segment requires at least one timestamp");
    };
    debug_assert!(
        timestamps.is_sorted(),
        "segment requires timestamps sorted ascending"
    );

    let mut sessions = Vec::new();
    let mut current = ActiveSession::at(first);

    for &ts in rest {
        if (ts - current.end).num_milliseconds() <= config.gap_threshold_ms {
            current.end = ts;
        } else {
            sessions.push(current);
            current = ActiveSession::at(ts);
        }
    }
    sessions.push(current);

    sessions
}

/// Total active time across sessions.
pub fn total_active(sessions: &[ActiveSession]) -> ActiveDuration {
    ActiveDuration::from_minutes(sessions.iter().map(ActiveSession::duration_minutes).sum())
}

/// Estimate active time for sorted, non-empty timestamps.
pub fn estimate_active(timestamps: &[DateTime<Utc>], config: &SegmentConfig) -> ActiveDuration {
    if timestamps.len() == 1 {
        return ActiveDuration::from_minutes(1);
    }
    total_active(&segment(timestamps, config))
}
