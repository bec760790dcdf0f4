//! `availabilities` CLI — compute bookable slots from an event list.
//!
//! ## Usage
//!
//! ```sh
//! # One week of availability from a JSON array of event rows
//! availabilities compute --date 2024-01-01 -i events.json
//!
//! # Read events from stdin, three days, dates and times in Paris
//! cat events.json | availabilities compute --date 2024-01-01 --days 3 --timezone Europe/Paris
//!
//! # Write the result to a file
//! availabilities compute --date 2024-01-01 -i events.json -o availability.json
//!
//! # Slot labels covered by one interval
//! availabilities expand --start 2024-01-01T09:00:00Z --end 2024-01-01T10:00:00Z
//!
//! # Defaults from a TOML file
//! availabilities --config availability.toml compute --date 2024-01-01 -i events.json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=availability_engine=debug` to trace the reduction.

mod config;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use availability_engine::{
    expand_slots, parse_reference_date, AvailabilityEngine, DayBucket, EngineConfig, EventSource,
    JsonFileSource, MemorySource,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(
    name = "availabilities",
    version,
    about = "Compute bookable time slots from opening and appointment events"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-day availability for a window of days
    Compute {
        /// Reference date (YYYY-MM-DD or RFC 3339 timestamp)
        #[arg(short, long)]
        date: String,
        /// Number of days in the window [default: 7]
        #[arg(long)]
        days: Option<u32>,
        /// IANA timezone in which dates and times are read [default: UTC]
        #[arg(long)]
        timezone: Option<String>,
        /// JSON file of event rows (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the slot labels covering one interval
    Expand {
        /// Interval start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Interval end, exclusive (RFC 3339)
        #[arg(long)]
        end: String,
        /// IANA timezone in which times are read [default: UTC]
        #[arg(long)]
        timezone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(&file_config.log.filter);

    match cli.command {
        Commands::Compute {
            date,
            days,
            timezone,
            input,
            output,
        } => {
            let engine_config = EngineConfig {
                number_of_days: days.unwrap_or(file_config.engine.number_of_days),
                timezone: resolve_timezone(timezone.as_deref(), file_config.engine.timezone)?,
            };
            engine_config.validate().context("Invalid --days")?;
            let reference = parse_reference_date(&date, engine_config.timezone)
                .context("Invalid --date")?;

            let buckets = match input {
                Some(path) => compute(JsonFileSource::new(path), engine_config, reference).await?,
                None => {
                    let json = read_stdin()?;
                    let source =
                        MemorySource::from_json(&json).context("Failed to parse event rows")?;
                    compute(source, engine_config, reference).await?
                }
            };

            let mut rendered = serde_json::to_string_pretty(&buckets)?;
            rendered.push('\n');
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Expand {
            start,
            end,
            timezone,
        } => {
            let calendar = resolve_timezone(timezone.as_deref(), file_config.engine.timezone)?;
            let start = parse_instant(&start).context("Invalid --start")?;
            let end = parse_instant(&end).context("Invalid --end")?;

            let slots = expand_slots(
                start.with_timezone(&calendar).naive_local(),
                end.with_timezone(&calendar).naive_local(),
            );
            for slot in slots {
                println!("{}", slot);
            }
        }
    }

    Ok(())
}

async fn compute<S: EventSource>(
    source: S,
    config: EngineConfig,
    reference: NaiveDate,
) -> Result<Vec<DayBucket>> {
    let engine = AvailabilityEngine::with_config(source, config);
    let buckets = engine
        .compute_default(reference)
        .await
        .context("Failed to compute availability")?;
    debug!(days = buckets.len(), "availability computed");
    Ok(buckets)
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// `--timezone` if given, the configured calendar otherwise.
fn resolve_timezone(flag: Option<&str>, configured: Tz) -> Result<Tz> {
    match flag {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown timezone: '{}'", name)),
        None => Ok(configured),
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(s.trim())
        .with_context(|| format!("expected an RFC 3339 timestamp, got '{}'", s))?;
    Ok(dt.with_timezone(&Utc))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read from stdin")?;
    Ok(buf)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
