//! Task data structure and ingestion of stored task records.
//!
//! A stored record is loosely typed: timestamps may be ISO strings or epoch
//! milliseconds and the flags may be missing. `RawTask` mirrors that shape and
//! `Task::from_raw` turns it into the strongly typed form every other module
//! works with.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::{HistoryError, Result};
use crate::time::normalize_timestamp;

/// Task identifier: stores written by different clients use either numbers or strings.
///
/// Any JSON number is accepted, including negative and fractional ids such
/// as `Date.now() + Math.random()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(Number),
    Text(String),
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Number(n.into())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

/// A to-do item as seen by the history view.
///
/// `expired` is trusted as stored; it is never recomputed from `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(serialize_with = "ser_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "ser_opt_millis")]
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub is_complete: bool,
}

/// Wire shape of a stored record, before timestamp normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub id: TaskId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default)]
    pub expires_at: Value,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub is_complete: bool,
}

impl RawTask {
    /// Decode a single element of the stored array.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| HistoryError::Record(e.to_string()))
    }
}

impl Task {
    /// Normalize a raw record. Offset-less timestamps are read in `tz`.
    ///
    /// Fails only on a bad `createdAt`. A bad `expiresAt` is display-only
    /// information and becomes `None`.
    pub fn from_raw<Tz: TimeZone>(raw: RawTask, tz: &Tz) -> Result<Self> {
        let created_at = normalize_timestamp("createdAt", &raw.created_at, tz)?;
        let expires_at = match normalize_timestamp("expiresAt", &raw.expires_at, tz) {
            Ok(t) => Some(t),
            Err(e) => {
                debug!(id = %raw.id, "ignoring expiry: {e}");
                None
            }
        };
        Ok(Task {
            id: raw.id,
            text: raw.text,
            created_at,
            expires_at,
            expired: raw.expired,
            is_complete: raw.is_complete,
        })
    }
}

fn ser_millis<S: serde::Serializer>(t: &DateTime<Utc>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

fn ser_opt_millis<S: serde::Serializer>(
    t: &Option<DateTime<Utc>>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match t {
        Some(t) => ser_millis(t, s),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use rstest::rstest;
    use serde_json::json;

    fn ingest(value: Value) -> Result<Task> {
        RawTask::from_value(value).and_then(|raw| Task::from_raw(raw, &Utc))
    }

    #[test]
    fn ingests_mixed_timestamp_representations() {
        let task = ingest(json!({
            "id": 7,
            "text": "Ship release notes",
            "createdAt": "2026-10-14T08:00:00.000Z",
            "expiresAt": 1_792_022_399_999_i64,
            "expired": true,
            "isComplete": false
        }))
        .unwrap();
        assert_eq!(task.id, TaskId::from(7));
        assert_eq!(task.created_at.to_rfc3339(), "2026-10-14T08:00:00+00:00");
        assert_eq!(task.expires_at.unwrap().timestamp_millis(), 1_792_022_399_999);
        assert!(task.expired);
        assert!(!task.is_complete);
    }

    #[test]
    fn string_ids_are_kept_verbatim() {
        let task = ingest(json!({"id": "a1b2", "createdAt": "2026-10-14"})).unwrap();
        assert_eq!(task.id.to_string(), "a1b2");
        assert_eq!(task.text, "");
    }

    #[rstest]
    #[case::negative(json!(-1), "-1")]
    #[case::fractional(json!(1_760_400_000_000.5), "1760400000000.5")]
    #[case::large(json!(18_446_744_073_709_551_615_u64), "18446744073709551615")]
    #[case::text(json!("c0ffee"), "c0ffee")]
    fn any_integer_or_string_id_is_accepted(#[case] id: Value, #[case] shown: &str) {
        let task = ingest(json!({"id": id.clone(), "createdAt": 0, "expired": true})).unwrap();
        assert_eq!(task.id.to_string(), shown);
        assert_eq!(serde_json::to_value(&task).unwrap()["id"], id);
    }

    #[test]
    fn offset_less_created_at_is_read_in_local_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let raw = RawTask::from_value(json!({
            "id": 7,
            "createdAt": "2026-10-14T08:00:00.000",
            "expired": true
        }))
        .unwrap();
        let task = Task::from_raw(raw, &tz).unwrap();
        assert_eq!(task.created_at.to_rfc3339(), "2026-10-14T06:00:00+00:00");
    }

    #[test]
    fn missing_flags_default_to_false() {
        let task = ingest(json!({"id": 1, "createdAt": 0})).unwrap();
        assert!(!task.expired);
        assert!(!task.is_complete);
        assert_eq!(task.expires_at, None);
    }

    #[test]
    fn bad_created_at_is_a_timestamp_error() {
        let err = ingest(json!({"id": 1, "createdAt": "yesterday-ish", "expired": true})).unwrap_err();
        assert!(matches!(err, HistoryError::Timestamp { field: "createdAt", .. }));
    }

    #[test]
    fn missing_created_at_is_a_timestamp_error() {
        let err = ingest(json!({"id": 1, "expired": true})).unwrap_err();
        assert!(matches!(err, HistoryError::Timestamp { .. }));
    }

    #[test]
    fn bad_expires_at_is_tolerated() {
        let task = ingest(json!({"id": 1, "createdAt": 0, "expiresAt": "soon"})).unwrap();
        assert_eq!(task.expires_at, None);
    }

    #[test]
    fn non_boolean_expired_flag_is_a_record_error() {
        let err = ingest(json!({"id": 1, "createdAt": 0, "expired": "true"})).unwrap_err();
        assert!(matches!(err, HistoryError::Record(_)));
    }

    #[test]
    fn missing_id_is_a_record_error() {
        let err = ingest(json!({"createdAt": 0, "expired": true})).unwrap_err();
        assert!(matches!(err, HistoryError::Record(_)));
    }

    #[test]
    fn serializes_with_wire_names_and_millisecond_timestamps() {
        let task = ingest(json!({"id": 3, "text": "x", "createdAt": 1_000, "expired": true})).unwrap();
        let out = serde_json::to_value(&task).unwrap();
        assert_eq!(
            out,
            json!({
                "id": 3,
                "text": "x",
                "createdAt": "1970-01-01T00:00:01.000Z",
                "expiresAt": null,
                "expired": true,
                "isComplete": false
            })
        );
    }
}
