//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use daylog_core::{Event, parse_time_zone, scan_transcripts};

use crate::Config;

/// The timezone that decides day boundaries and wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportZone {
    /// The process's local timezone.
    Local,
    /// A named IANA timezone.
    Named(Tz),
}

impl ReportZone {
    /// Pick the zone: the command-line flag wins over config, then local time.
    pub fn resolve(flag: Option<&str>, configured: Option<&str>) -> Result<Self> {
        match flag.or(configured) {
            Some(name) => {
                let tz = parse_time_zone(name)
                    .with_context(|| format!("invalid timezone {name:?}, expected e.g. Europe/Berlin"))?;
                Ok(Self::Named(tz))
            }
            None => Ok(Self::Local),
        }
    }

    /// Human-readable zone name for report headers.
    pub fn name(&self) -> String {
        match self {
            Self::Local => iana_time_zone::get_timezone().unwrap_or_else(|_| "local".to_string()),
            Self::Named(tz) => tz.name().to_string(),
        }
    }
}

/// Load every transcript event under the configured projects directory.
pub fn load_events(config: &Config) -> Result<Vec<Event>> {
    let events = scan_transcripts(&config.projects_dir).with_context(|| {
        format!(
            "failed to scan transcripts in {}",
            config.projects_dir.display()
        )
    })?;
    tracing::debug!(count = events.len(), "loaded transcript events");
    Ok(events)
}
