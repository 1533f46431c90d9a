//! Expired-task selection by calendar day.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, TimeZone};
use tracing::warn;

use crate::task::Task;
use crate::time::{local_day, DayWindow};

/// Tasks flagged expired whose creation time falls inside `selected`'s local
/// calendar day, in their original order.
///
/// Only `expired` and `created_at` are consulted. The wall clock is never
/// read, so the result depends on nothing but the two arguments.
pub fn filter_expired_for_date<'t, Tz: TimeZone>(
    tasks: &'t [Task],
    selected: NaiveDate,
    tz: &Tz,
) -> Vec<&'t Task> {
    let Some(window) = DayWindow::for_day(selected, tz) else {
        warn!(%selected, "selected day is outside the representable range");
        return Vec::new();
    };
    tasks
        .iter()
        .filter(|t| t.expired && window.contains(&t.created_at))
        .collect()
}

/// Per-day counts of what `filter_expired_for_date` returns, for every day of
/// the month containing `month`. Days without expired tasks are omitted.
pub fn expired_days_in_month<Tz: TimeZone>(
    tasks: &[Task],
    month: NaiveDate,
    tz: &Tz,
) -> BTreeMap<NaiveDate, usize> {
    let mut days = BTreeMap::new();
    for task in tasks.iter().filter(|t| t.expired) {
        let day = local_day(&task.created_at, tz);
        if day.year() == month.year() && day.month() == month.month() {
            *days.entry(day).or_insert(0) += 1;
        }
    }
    days
}
