//! Daily command for per-day activity summaries.
//!
//! This module implements `daylog daily` with date filtering
//! (--since, --until), timezone selection and output formats
//! (human-readable table, JSON).

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, TimeZone};
use daylog_core::{DailyReport, DailySummary, DailyTotals, DateRange, Event, SegmentConfig};
use serde::Serialize;

use super::events::EventRow;
use super::util::ReportZone;

/// Output options for the daily command.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyOptions {
    pub json: bool,
    pub show_sessions: bool,
    pub include_events: bool,
}

/// JSON report structure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub timezone: &'a str,
    pub daily: &'a [DailySummary],
    pub totals: DailyTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventRow<'a>>>,
}

// ========== Table Output ==========

/// Writes the human-readable table.
pub fn write_table<W: Write>(
    writer: &mut W,
    days: &[DailySummary],
    timezone: &str,
    show_sessions: bool,
) -> std::io::Result<()> {
    writeln!(writer, "DAILY ACTIVITY ({timezone})")?;
    writeln!(writer)?;

    if days.is_empty() {
        writeln!(writer, "No activity found for the selected range.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<10}  {:>5}  {:>5}  {:>8}  {:>8}  {:>8}",
        "Date", "First", "Last", "Active", "Messages", "Sessions"
    )?;
    writeln!(writer, "{}", "─".repeat(54))?;

    for day in days {
        writeln!(
            writer,
            "{:<10}  {:>5}  {:>5}  {:>8}  {:>8}  {:>8}",
            day.date.to_string(),
            day.first_message_time.to_string(),
            day.last_message_time.to_string(),
            day.active_duration.to_string(),
            day.message_count,
            day.session_ids.len()
        )?;
        if show_sessions {
            for id in &day.session_ids {
                writeln!(writer, "  - {id}")?;
            }
        }
    }

    let totals = DailyTotals::from_summaries(days);
    writeln!(writer, "{}", "─".repeat(54))?;
    writeln!(
        writer,
        "{:<10}  {:>5}  {:>5}  {:>8}  {:>8}  {:>8}",
        "Total",
        "",
        "",
        totals.active_duration.to_string(),
        totals.message_count,
        totals.session_count
    )?;

    Ok(())
}

// ========== JSON Output ==========

/// Formats the report as pretty JSON.
pub fn format_json<Tz>(
    report: &DailyReport<'_, Event>,
    timezone: &str,
    tz: &Tz,
    include_events: bool,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let json = JsonReport {
        timezone,
        daily: &report.days,
        totals: DailyTotals::from_summaries(&report.days),
        events: include_events.then(|| {
            report
                .events
                .iter()
                .map(|event| EventRow::new(event, tz))
                .collect()
        }),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

// ========== Public Interface ==========

/// Runs the daily command.
pub fn run<W: Write>(
    writer: &mut W,
    events: &[Event],
    range: &DateRange,
    zone: ReportZone,
    options: DailyOptions,
) -> Result<()> {
    let timezone = zone.name();
    match zone {
        ReportZone::Local => render(writer, events, range, &timezone, &Local, options),
        ReportZone::Named(tz) => render(writer, events, range, &timezone, &tz, options),
    }
}

fn render<W, Tz>(
    writer: &mut W,
    events: &[Event],
    range: &DateRange,
    timezone: &str,
    tz: &Tz,
    options: DailyOptions,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let report = DailyReport::build(events, range, tz, &SegmentConfig::default());
    tracing::debug!(
        days = report.days.len(),
        events = report.events.len(),
        "aggregated daily report"
    );

    if options.json {
        let output = format_json(&report, timezone, tz, options.include_events)?;
        writeln!(writer, "{output}")?;
    } else {
        write_table(writer, &report.days, timezone, options.show_sessions)?;
    }

    Ok(())
}
