//! Command-line argument definitions.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use daylog_core::{DateRange, LocalDate};

/// Daily activity summaries from conversation transcripts.
///
/// Reads JSONL transcripts, groups messages by local calendar day and
/// estimates how long you were actively chatting each day.
#[derive(Debug, Parser)]
#[command(name = "daylog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show per-day activity: first/last message, active time, counts.
    Daily {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// List the session IDs under each day.
        #[arg(long)]
        sessions: bool,

        /// Include the filtered events in the JSON output.
        #[arg(long, requires = "json")]
        events: bool,
    },

    /// Print the filtered events as JSONL, oldest first.
    Events {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

/// Date and timezone selection shared by subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// First day to include (inclusive).
    #[arg(long, value_name = "YYYYMMDD", value_parser = LocalDate::parse_compact)]
    pub since: Option<LocalDate>,

    /// Last day to include (inclusive).
    #[arg(long, value_name = "YYYYMMDD", value_parser = LocalDate::parse_compact)]
    pub until: Option<LocalDate>,

    /// IANA timezone for day boundaries (defaults to the system timezone).
    #[arg(long, value_name = "TZ")]
    pub timezone: Option<String>,
}

impl FilterArgs {
    /// The inclusive date range, rejecting `--since` after `--until`.
    pub fn range(&self) -> anyhow::Result<DateRange> {
        let range = DateRange::new(self.since, self.until);
        if range.is_inverted() {
            bail!(
                "--since ({}) is after --until ({})",
                self.since.map(|d| d.to_string()).unwrap_or_default(),
                self.until.map(|d| d.to_string()).unwrap_or_default()
            );
        }
        Ok(range)
    }
}
