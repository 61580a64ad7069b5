//! Daily activity aggregation.
//!
//! Buckets events by calendar date in a caller-supplied timezone and rolls
//! each day up into a [`DailySummary`].
//!
//! # Algorithm Summary
//!
//! 1. Drop events whose local date falls outside the inclusive [`DateRange`]
//! 2. Group the rest by local date in an ordered map
//! 3. Per date: sort by timestamp, segment into active sessions, collect
//!    first/last wall-clock time, message count and distinct session IDs
//! 4. Emit days newest first
//!
//! The timezone decides which "day" an event belongs to: the same input
//! buckets differently under different zones. Callers that want the user's
//! wall-clock day pass `chrono::Local`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::event::ActivityEvent;
use crate::format::{ActiveDuration, ClockTime};
use crate::segment::{SegmentConfig, estimate_active};
use crate::types::{LocalDate, SessionId};

/// Inclusive calendar-date bounds. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<LocalDate>,
    pub until: Option<LocalDate>,
}

impl DateRange {
    #[must_use]
    pub const fn new(since: Option<LocalDate>, until: Option<LocalDate>) -> Self {
        Self { since, until }
    }

    /// A range with neither bound.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(None, None)
    }

    pub fn contains(&self, date: LocalDate) -> bool {
        self.since.is_none_or(|since| date >= since) && self.until.is_none_or(|until| date <= until)
    }

    /// True when `since` is after `until`, which matches nothing.
    pub fn is_inverted(&self) -> bool {
        matches!((self.since, self.until), (Some(since), Some(until)) if since > until)
    }
}

/// Activity statistics for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: LocalDate,
    pub first_message_time: ClockTime,
    pub last_message_time: ClockTime,
    pub active_duration: ActiveDuration,
    pub message_count: usize,
    pub session_ids: BTreeSet<SessionId>,
}

impl DailySummary {
    /// Build a summary from one day's events, sorted ascending.
    fn from_sorted<E, Tz>(date: LocalDate, events: &[&E], tz: &Tz, config: &SegmentConfig) -> Self
    where
        E: ActivityEvent,
        Tz: TimeZone,
    {
        let timestamps: Vec<DateTime<Utc>> = events.iter().map(|e| e.timestamp()).collect();
        let (first, last) = match (timestamps.first(), timestamps.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => unreachable!("date groups are never empty"),
        };

        Self {
            date,
            first_message_time: ClockTime::of(first, tz),
            last_message_time: ClockTime::of(last, tz),
            active_duration: estimate_active(&timestamps, config),
            message_count: events.len(),
            session_ids: events
                .iter()
                .filter_map(|e| e.session_id().cloned())
                .collect(),
        }
    }
}

/// Summaries plus the filtered events they were built from.
#[derive(Debug)]
pub struct DailyReport<'a, E> {
    /// Days newest first.
    pub days: Vec<DailySummary>,
    /// Events inside the range, oldest first.
    pub events: Vec<&'a E>,
}

impl<'a, E: ActivityEvent> DailyReport<'a, E> {
    pub fn build<Tz: TimeZone>(
        events: &'a [E],
        range: &DateRange,
        tz: &Tz,
        config: &SegmentConfig,
    ) -> Self {
        let groups = group_by_date(events, range, tz);
        let days = summarize_groups(&groups, tz, config);
        let mut events: Vec<&E> = groups.into_values().flatten().collect();
        events.sort_by_key(|e| e.timestamp());
        Self { days, events }
    }
}

/// Aggregate events into per-day summaries, newest day first.
pub fn aggregate_daily<E, Tz>(
    events: &[E],
    range: &DateRange,
    tz: &Tz,
    config: &SegmentConfig,
) -> Vec<DailySummary>
where
    E: ActivityEvent,
    Tz: TimeZone,
{
    let groups = group_by_date(events, range, tz);
    summarize_groups(&groups, tz, config)
}

/// Events whose local date lies inside `range`, oldest first.
pub fn filter_events<'a, E, Tz>(events: &'a [E], range: &DateRange, tz: &Tz) -> Vec<&'a E>
where
    E: ActivityEvent,
    Tz: TimeZone,
{
    let mut kept: Vec<&E> = events
        .iter()
        .filter(|e| range.contains(LocalDate::of(&e.timestamp(), tz)))
        .collect();
    kept.sort_by_key(|e| e.timestamp());
    kept
}

/// Partition in-range events by local date; each group is sorted ascending.
fn group_by_date<'a, E, Tz>(
    events: &'a [E],
    range: &DateRange,
    tz: &Tz,
) -> BTreeMap<LocalDate, Vec<&'a E>>
where
    E: ActivityEvent,
    Tz: TimeZone,
{
    let mut groups: BTreeMap<LocalDate, Vec<&E>> = BTreeMap::new();
    for event in events {
        let date = LocalDate::of(&event.timestamp(), tz);
        if range.contains(date) {
            groups.entry(date).or_default().push(event);
        }
    }
    for group in groups.values_mut() {
        group.sort_by_key(|e| e.timestamp());
    }
    tracing::debug!(
        input = events.len(),
        days = groups.len(),
        "grouped events by local date"
    );
    groups
}

fn summarize_groups<E, Tz>(
    groups: &BTreeMap<LocalDate, Vec<&E>>,
    tz: &Tz,
    config: &SegmentConfig,
) -> Vec<DailySummary>
where
    E: ActivityEvent,
    Tz: TimeZone,
{
    groups
        .iter()
        .rev()
        .map(|(date, group)| DailySummary::from_sorted(*date, group, tz, config))
        .collect()
}

/// Totals across a set of daily summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub days: usize,
    pub message_count: usize,
    pub active_duration: ActiveDuration,
    /// Distinct sessions across all days; a session spanning midnight counts once.
    pub session_count: usize,
}

impl DailyTotals {
    pub fn from_summaries(days: &[DailySummary]) -> Self {
        let sessions: BTreeSet<&SessionId> = days.iter().flat_map(|d| &d.session_ids).collect();
        Self {
            days: days.len(),
            message_count: days.iter().map(|d| d.message_count).sum(),
            active_duration: days.iter().map(|d| d.active_duration).sum(),
            session_count: sessions.len(),
        }
    }
}
