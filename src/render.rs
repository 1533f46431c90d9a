//! Text and JSON presentation of the history view.

use std::collections::BTreeMap;
use std::io::{self, Write};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::task::Task;

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub const EMPTY_MESSAGE: &str = "No expired tasks found for this date.";

/// "October 14, 2026"
pub fn format_heading_date(day: NaiveDate) -> String {
    day.format("%B %-d, %Y").to_string()
}

/// "9:05:00 PM" in `tz`.
pub fn format_clock<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format("%-I:%M:%S %p").to_string()
}

pub fn format_completion(task: &Task) -> &'static str {
    if task.is_complete {
        "COMPLETED"
    } else {
        "INCOMPLETE"
    }
}

/// Print the history view for `day`.
pub fn write_history<W: Write, Tz: TimeZone>(
    out: &mut W,
    day: NaiveDate,
    tasks: &[&Task],
    tz: &Tz,
) -> io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    writeln!(out, "Expired Tasks for {}", format_heading_date(day))?;
    writeln!(out)?;
    if tasks.is_empty() {
        writeln!(out, "{EMPTY_MESSAGE}")?;
        return Ok(());
    }
    for task in tasks {
        let expires = task
            .expires_at
            .map(|e| format_clock(&e, tz))
            .unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "#{:<6} EXPIRED  {:<10}  expires {:>11}  created {:>11}",
            task.id.to_string(),
            format_completion(task),
            expires,
            format_clock(&task.created_at, tz),
        )?;
        writeln!(out, "        {}", task.text)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct HistoryJson<'a> {
    date: NaiveDate,
    tasks: &'a [&'a Task],
}

/// Pretty JSON: `{"date": "YYYY-MM-DD", "tasks": [...]}`.
pub fn write_history_json<W: Write>(out: &mut W, day: NaiveDate, tasks: &[&Task]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &HistoryJson { date: day, tasks })?;
    writeln!(out).map_err(serde_json::Error::io)
}

/// Days of a month that have expired history, one per line.
pub fn write_days<W: Write>(out: &mut W, month: NaiveDate, days: &BTreeMap<NaiveDate, usize>) -> io::Result<()> {
    writeln!(out, "Expired task history for {}", month.format("%B %Y"))?;
    if days.is_empty() {
        writeln!(out, "  -")?;
        return Ok(());
    }
    for (day, count) in days {
        let noun = if *count == 1 { "task" } else { "tasks" };
        writeln!(out, "  {} {:>3} {}", day.format("%a %Y-%m-%d"), count, noun)?;
    }
    Ok(())
}
