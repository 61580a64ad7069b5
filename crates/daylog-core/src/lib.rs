//! Core domain logic for daylog.
//!
//! This crate contains the fundamental types and logic for:
//! - Segmentation: splitting message timestamps into active sessions
//! - Daily aggregation: rolling events up into per-day summaries
//! - Transcript loading: reading conversation JSONL files into events

pub mod daily;
pub mod event;
pub mod format;
pub mod segment;
pub mod transcript;
pub mod types;

pub use daily::{
    DailyReport, DailySummary, DailyTotals, DateRange, aggregate_daily, filter_events,
};
pub use event::{ActivityEvent, Event};
pub use format::{ActiveDuration, ClockTime};
pub use segment::{
    ActiveSession, DEFAULT_GAP_THRESHOLD_MS, SegmentConfig, estimate_active, segment, total_active,
};
pub use transcript::{TranscriptError, parse_transcript_file, scan_transcripts};
pub use types::{LocalDate, SessionId, ValidationError, parse_time_zone, parse_timestamp};
