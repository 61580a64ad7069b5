//! Events command for dumping the filtered message stream.
//!
//! This module outputs every in-range event as JSONL, oldest first, with
//! its timestamp rendered in the report timezone.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, TimeZone};
use daylog_core::{ActivityEvent, ClockTime, DateRange, Event, LocalDate, SessionId, filter_events};
use serde::Serialize;

use super::util::ReportZone;

/// One event as shown to the user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow<'a> {
    pub timestamp: String,
    pub date: LocalDate,
    pub time: ClockTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a SessionId>,
}

impl<'a> EventRow<'a> {
    pub fn new<Tz>(event: &'a Event, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let instant = event.timestamp();
        Self {
            timestamp: instant.with_timezone(tz).to_rfc3339(),
            date: LocalDate::of(&instant, tz),
            time: ClockTime::of(&instant, tz),
            session_id: event.session_id(),
        }
    }
}

/// Runs the events command, outputting events as JSONL.
pub fn run<W: Write>(
    writer: &mut W,
    events: &[Event],
    range: &DateRange,
    zone: ReportZone,
) -> Result<()> {
    match zone {
        ReportZone::Local => write_events(writer, events, range, &Local),
        ReportZone::Named(tz) => write_events(writer, events, range, &tz),
    }
}

fn write_events<W, Tz>(writer: &mut W, events: &[Event], range: &DateRange, tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    for event in filter_events(events, range, tz) {
        let json = serde_json::to_string(&EventRow::new(event, tz))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}
