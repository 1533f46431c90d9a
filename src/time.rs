//! Time handling: timestamp normalization, calendar-day windows and
//! human-friendly day input.
//!
//! Stored tasks carry timestamps either as ISO-8601 strings or as epoch
//! milliseconds. Both are normalized to `DateTime<Utc>` with millisecond
//! precision as soon as they are read, so nothing downstream has to care
//! which representation a record used.

use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc,
    Weekday,
};
use serde_json::Value;

use crate::error::{HistoryError, Result};

/// Normalize a wire timestamp into a UTC instant truncated to milliseconds.
///
/// Accepted forms:
/// - a JSON number: epoch milliseconds (fractions are truncated)
/// - an RFC 3339 string, e.g. `2026-10-14T09:30:00.000Z`
/// - an ISO date-time without offset, e.g. `2026-10-14T09:30:00.000`, read as
///   wall-clock time in `tz`
/// - a bare `YYYY-MM-DD` string, read as midnight UTC
pub fn normalize_timestamp<Tz: TimeZone>(
    field: &'static str,
    value: &Value,
    tz: &Tz,
) -> Result<DateTime<Utc>> {
    let instant = match value {
        Value::Number(n) => {
            let millis = match n.as_i64() {
                Some(ms) => ms,
                None => match n.as_f64() {
                    Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => f.trunc() as i64,
                    _ => return Err(timestamp_error(field, format!("{n} is out of range"))),
                },
            };
            DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| timestamp_error(field, format!("{millis} ms is out of range")))?
        }
        Value::String(s) => parse_timestamp_str(field, s.trim(), tz)?,
        Value::Null => return Err(timestamp_error(field, "missing".to_string())),
        other => {
            return Err(timestamp_error(
                field,
                format!("expected ISO-8601 string or epoch milliseconds, got {other}"),
            ))
        }
    };
    Ok(instant.trunc_subsecs(3))
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_timestamp_str<Tz: TimeZone>(field: &'static str, s: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return resolve_local(naive, tz)
            .ok_or_else(|| timestamp_error(field, format!("'{s}' does not exist in the local timezone")));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }
    Err(timestamp_error(field, format!("'{s}' is not an ISO-8601 timestamp")))
}

fn timestamp_error(field: &'static str, reason: String) -> HistoryError {
    HistoryError::Timestamp { field, reason }
}

/// Closed interval `[start, end]` covering one local calendar day.
///
/// `end` is the last millisecond of the day, so a task created at
/// 23:59:59.999 belongs to the day and one created at the following midnight
/// does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for `day` as seen in `tz`. Returns `None` only at the edges of
    /// chrono's representable range.
    pub fn for_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<Self> {
        let start = start_of_day(day, tz)?;
        let end = start_of_day(day.succ_opt()?, tz)? - Duration::milliseconds(1);
        Some(DayWindow { start, end })
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

/// First instant of `day` in `tz`.
///
/// An ambiguous midnight resolves to its earlier occurrence. A midnight that
/// falls into a DST gap resolves to the first valid minute after it.
pub fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    resolve_local(day.and_hms_opt(0, 0, 0)?, tz)
}

/// Map a wall-clock time in `tz` to an instant. Ambiguous times take the
/// earlier occurrence; times inside a DST gap move forward to the first
/// valid minute.
pub fn resolve_local<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    (0..=180)
        .find_map(|minutes| {
            tz.from_local_datetime(&(local + Duration::minutes(minutes)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Last millisecond of `day` in `tz`, i.e. 23:59:59.999 local.
pub fn end_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    let last = day.and_hms_milli_opt(23, 59, 59, 999)?;
    tz.from_local_datetime(&last)
        .latest()
        .or_else(|| DayWindow::for_day(day, tz).map(|w| w.end.with_timezone(tz)))
}

/// Calendar day of `instant` in `tz`.
pub fn local_day<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Parse a human-friendly day relative to `today`.
///
/// Supports:
/// - "today", "yesterday"
/// - "3 days ago", "1 day ago", "3d ago", "2 weeks ago", "-3d"
/// - "friday", "fri" (most recent occurrence, today included)
/// - "last friday" (most recent occurrence strictly before today)
/// - "YYYY-MM-DD"
pub fn parse_day_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_suffix(" ago") {
        return parse_offset(rest.trim()).and_then(|days| today.checked_sub_days(days));
    }
    if let Some(rest) = s.strip_prefix('-') {
        return parse_offset(rest.trim()).and_then(|days| today.checked_sub_days(days));
    }

    if let Some(name) = s.strip_prefix("last ") {
        let target = Weekday::from_str(name.trim()).ok()?;
        let back = match days_since(today.weekday(), target) {
            0 => 7,
            n => n,
        };
        return today.checked_sub_days(Days::new(back));
    }
    if let Ok(target) = Weekday::from_str(&s) {
        return today.checked_sub_days(Days::new(days_since(today.weekday(), target)));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Parse "YYYY-MM" into the first day of that month.
pub fn parse_month_input(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| HistoryError::MonthInput(s.to_string()))
}

fn parse_offset(s: &str) -> Option<Days> {
    let (number, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => (&s[..idx], s[idx..].trim()),
        None => (s, "d"),
    };
    let n: u64 = number.parse().ok()?;
    let days = match unit {
        "d" | "day" | "days" => n,
        "w" | "week" | "weeks" => n.checked_mul(7)?,
        _ => return None,
    };
    Some(Days::new(days))
}

fn days_since(from: Weekday, target: Weekday) -> u64 {
    u64::from((from.num_days_from_monday() + 7 - target.num_days_from_monday()) % 7)
}
