use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use daylog_cli::commands::daily::{self, DailyOptions};
use daylog_cli::commands::events;
use daylog_cli::commands::util::{ReportZone, load_events};
use daylog_cli::{Cli, Commands, Config, FilterArgs};

/// Load config and everything the filter selects.
fn prepare(
    config_path: Option<&Path>,
    filter: &FilterArgs,
) -> Result<(Vec<daylog_core::Event>, daylog_core::DateRange, ReportZone)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let range = filter.range()?;
    let zone = ReportZone::resolve(filter.timezone.as_deref(), config.timezone.as_deref())?;
    let events = load_events(&config)?;
    Ok((events, range, zone))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Daily {
            filter,
            json,
            sessions,
            events: include_events,
        }) => {
            let (events, range, zone) = prepare(cli.config.as_deref(), filter)?;
            let options = DailyOptions {
                json: *json,
                show_sessions: *sessions,
                include_events: *include_events,
            };
            daily::run(&mut stdout, &events, &range, zone, options)?;
        }
        Some(Commands::Events { filter }) => {
            let (events, range, zone) = prepare(cli.config.as_deref(), filter)?;
            events::run(&mut stdout, &events, &range, zone)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
