//! Command implementations for the CLI interface.
//!
//! Handlers take their collaborators (task source, today's date, timezone,
//! output sink) as arguments so they can be driven from tests with an
//! in-memory store and a fixed clock. `main` wires in the real ones.

use std::io::Write;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{HistoryError, Result};
use crate::filter::{expired_days_in_month, filter_expired_for_date};
use crate::render::{write_days, write_history, write_history_json, OutputFormat};
use crate::source::{MergedSource, SampleTasks, StoredTasks, TaskSource};
use crate::store::KeyValueStore;
use crate::time::{parse_day_input, parse_month_input};

#[derive(Subcommand)]
pub enum Commands {
    /// Show expired tasks created on a given day.
    Show {
        /// Day to inspect: YYYY-MM-DD, "today", "yesterday", "3 days ago", "last friday".
        #[arg(long, short)]
        date: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the days of a month that have expired tasks.
    Days {
        /// Month as YYYY-MM (default: current month).
        #[arg(long)]
        month: Option<String>,
    },

    /// Print the built-in sample tasks as JSON.
    Samples,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Compose the configured providers: stored tasks first, then the samples.
pub fn build_source<'a, S, Tz>(config: &Config, store: &'a S, now: DateTime<Tz>) -> MergedSource<'a>
where
    S: KeyValueStore + ?Sized,
    Tz: TimeZone + 'a,
{
    let mut source =
        MergedSource::new().with(StoredTasks::new(store, config.key.clone(), now.timezone()));
    if config.include_samples {
        source = source.with(SampleTasks::anchored_at(now));
    }
    debug!(providers = source.len(), key = %config.key, "task source ready");
    source
}

/// Resolve the `--date` argument, defaulting to today.
pub fn resolve_day(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match input {
        None => Ok(today),
        Some(s) => parse_day_input(s, today).ok_or_else(|| HistoryError::DayInput(s.to_string())),
    }
}

/// Print the expired tasks created on the selected day.
pub fn cmd_show<W, Tz>(
    out: &mut W,
    source: &dyn TaskSource,
    date: Option<&str>,
    format: OutputFormat,
    today: NaiveDate,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let day = resolve_day(date, today)?;
    let tasks = source.tasks()?;
    let expired = filter_expired_for_date(&tasks, day, tz);
    info!(%day, total = tasks.len(), matched = expired.len(), "filtered expired tasks");

    match format {
        OutputFormat::Text => write_history(out, day, &expired, tz)?,
        OutputFormat::Json => write_history_json(out, day, &expired)?,
    }
    Ok(())
}

/// Print the days of a month that have expired history.
pub fn cmd_days<W, Tz>(
    out: &mut W,
    source: &dyn TaskSource,
    month: Option<&str>,
    today: NaiveDate,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
{
    let month = match month {
        Some(m) => parse_month_input(m)?,
        None => today.with_day(1).unwrap_or(today),
    };
    let tasks = source.tasks()?;
    let days = expired_days_in_month(&tasks, month, tz);
    write_days(out, month, &days)?;
    Ok(())
}

/// Print the sample tasks as they would be merged right now.
pub fn cmd_samples<W: Write, Tz: TimeZone>(out: &mut W, now: DateTime<Tz>) -> Result<()> {
    let samples = SampleTasks::anchored_at(now).build();
    serde_json::to_writer_pretty(&mut *out, &samples)?;
    writeln!(out)?;
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions<W: Write>(out: &mut W, shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, out);
}
