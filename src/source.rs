//! Task providers.
//!
//! The history view reads from two providers: tasks persisted in the store
//! and a fixed set of sample tasks that keeps the view populated on a fresh
//! install. `MergedSource` concatenates providers in order, so persisted
//! tasks always come first.

use chrono::{DateTime, Days, SubsecRound, TimeZone, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{HistoryError, Result};
use crate::store::KeyValueStore;
use crate::task::{RawTask, Task, TaskId};
use crate::time::end_of_day;

/// Anything that can hand out a snapshot of tasks.
pub trait TaskSource {
    fn tasks(&self) -> Result<Vec<Task>>;
}

/// Tasks persisted under a single store key. Offset-less timestamps in the
/// stored records are read in `tz`.
pub struct StoredTasks<'a, S: KeyValueStore + ?Sized, Tz: TimeZone> {
    store: &'a S,
    key: String,
    tz: Tz,
}

impl<'a, S: KeyValueStore + ?Sized, Tz: TimeZone> StoredTasks<'a, S, Tz> {
    pub fn new(store: &'a S, key: impl Into<String>, tz: Tz) -> Self {
        StoredTasks { store, key: key.into(), tz }
    }
}

impl<S: KeyValueStore + ?Sized, Tz: TimeZone> TaskSource for StoredTasks<'_, S, Tz> {
    /// Never fails: a missing key is an empty collection, and an unreadable
    /// or corrupt payload is discarded with a warning so the other providers
    /// still show.
    fn tasks(&self) -> Result<Vec<Task>> {
        match self.store.get(&self.key) {
            Ok(Some(payload)) => Ok(parse_payload(&self.key, &payload, &self.tz)),
            Ok(None) => Ok(Vec::new()),
            Err(e) => {
                warn!(key = %self.key, "discarding stored tasks: {e}");
                Ok(Vec::new())
            }
        }
    }
}

/// Decode a stored payload, dropping whatever cannot be trusted.
pub fn parse_payload<Tz: TimeZone>(key: &str, payload: &[u8], tz: &Tz) -> Vec<Task> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Vec::new();
    }

    let records = match serde_json::from_slice::<Value>(payload) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            let err = HistoryError::Payload(format!("found {}", json_kind(&other)));
            warn!(key, "discarding stored tasks: {err}");
            return Vec::new();
        }
        Err(e) => {
            let err = HistoryError::Payload(e.to_string());
            warn!(key, "discarding stored tasks: {err}");
            return Vec::new();
        }
    };

    let total = records.len();
    let tasks: Vec<Task> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match RawTask::from_value(record).and_then(|raw| Task::from_raw(raw, tz)) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(key, index, "skipping stored task: {e}");
                    None
                }
            }
        })
        .collect();

    if tasks.len() < total {
        info!(key, kept = tasks.len(), skipped = total - tasks.len(), "loaded stored tasks");
    }
    tasks
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Id, text, days before "now", completed.
const SAMPLES: [(u64, &str, u64, bool); 5] = [
    (
        1,
        "This is a test task that is expired and complete , you can see your future expired tasks here",
        1,
        true,
    ),
    (
        2,
        "This is a test task that is expired and incomplete , you can see your future expired tasks here",
        2,
        false,
    ),
    (3, "Review team updates", 2, true),
    (4, "Update documentation and audit the code", 3, false),
    (5, "Client meeting preparation and update the code", 3, true),
];

/// The five built-in sample tasks, positioned relative to a given "now".
///
/// Every sample is expired. Its expiry is 23:59:59.999 local time on the day
/// it was created. Samples are never written back to the store.
#[derive(Debug, Clone)]
pub struct SampleTasks<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl<Tz: TimeZone> SampleTasks<Tz> {
    pub fn anchored_at(now: DateTime<Tz>) -> Self {
        SampleTasks { now }
    }

    pub fn build(&self) -> Vec<Task> {
        let tz = self.now.timezone();
        SAMPLES
            .iter()
            .filter_map(|&(id, text, days_ago, is_complete)| {
                let created = self.now.clone().checked_sub_days(Days::new(days_ago))?;
                let expires_at = end_of_day(created.date_naive(), &tz).map(|e| e.with_timezone(&Utc));
                Some(Task {
                    id: TaskId::from(id),
                    text: text.to_string(),
                    created_at: created.with_timezone(&Utc).trunc_subsecs(3),
                    expires_at,
                    expired: true,
                    is_complete,
                })
            })
            .collect()
    }
}

impl<Tz: TimeZone> TaskSource for SampleTasks<Tz> {
    fn tasks(&self) -> Result<Vec<Task>> {
        Ok(self.build())
    }
}

/// Concatenation of providers, in the order they were added.
#[derive(Default)]
pub struct MergedSource<'a> {
    providers: Vec<Box<dyn TaskSource + 'a>>,
}

impl<'a> MergedSource<'a> {
    pub fn new() -> Self {
        MergedSource { providers: Vec::new() }
    }

    pub fn with(mut self, provider: impl TaskSource + 'a) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl TaskSource for MergedSource<'_> {
    fn tasks(&self) -> Result<Vec<Task>> {
        let mut all = Vec::new();
        for provider in &self.providers {
            all.extend(provider.tasks()?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{FixedOffset, NaiveDate};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 16, 14, 30, 0)
            .unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn samples_are_anchored_to_now() {
        let samples = SampleTasks::anchored_at(now()).build();
        assert_eq!(ids(&samples), ["1", "2", "3", "4", "5"]);
        assert!(samples.iter().all(|t| t.expired));
        assert_eq!(
            samples.iter().map(|t| t.is_complete).collect::<Vec<_>>(),
            [true, false, true, false, true]
        );

        let tz = now().timezone();
        let created: Vec<NaiveDate> = samples
            .iter()
            .map(|t| t.created_at.with_timezone(&tz).date_naive())
            .collect();
        let day = |d| NaiveDate::from_ymd_opt(2026, 10, d).unwrap();
        assert_eq!(created, [day(15), day(14), day(14), day(13), day(13)]);

        let expiry = samples[1].expires_at.unwrap().with_timezone(&tz);
        assert_eq!(expiry.to_rfc3339(), "2026-10-14T23:59:59.999+02:00");
        assert!(samples.iter().all(|t| t.expires_at.unwrap() >= t.created_at));
    }

    #[test]
    fn stored_tasks_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(StoredTasks::new(&store, "todos", Utc).tasks().unwrap().is_empty());
    }

    #[test]
    fn stored_tasks_empty_string_is_empty() {
        let store = MemoryStore::new().with_entry("todos", "");
        assert!(StoredTasks::new(&store, "todos", Utc).tasks().unwrap().is_empty());
    }

    #[test]
    fn corrupt_payload_is_discarded() {
        for payload in ["{not json", "null", "{\"id\": 1}", "42"] {
            let store = MemoryStore::new().with_entry("todos", payload);
            let tasks = StoredTasks::new(&store, "todos", Utc).tasks().unwrap();
            assert!(tasks.is_empty(), "payload {payload:?} should be discarded");
        }
    }

    #[test]
    fn malformed_records_are_skipped_individually() {
        let payload = r#"[
            {"id": 10, "text": "ok", "createdAt": "2026-10-14T10:00:00Z", "expired": true},
            {"id": 11, "text": "bad date", "createdAt": "sometime", "expired": true},
            "not a record",
            {"id": "x-12", "text": "epoch", "createdAt": 1792000000000, "expired": false}
        ]"#;
        let store = MemoryStore::new().with_entry("todos", payload);
        let tasks = StoredTasks::new(&store, "todos", Utc).tasks().unwrap();
        assert_eq!(ids(&tasks), ["10", "x-12"]);
    }

    #[test]
    fn records_with_any_id_and_offset_less_dates_are_kept() {
        let payload = r#"[
            {"id": -1, "createdAt": "2026-10-14T09:00:00.000Z", "expired": true},
            {"id": 1.5, "createdAt": "2026-10-14T10:00:00.000Z", "expired": true},
            {"id": 7, "createdAt": "2026-10-14T08:00:00.000", "expired": true},
            {"id": 8, "createdAt": 1791964800000, "expired": true}
        ]"#;
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let tasks = parse_payload("todos", payload.as_bytes(), &tz);
        assert_eq!(ids(&tasks), ["-1", "1.5", "7", "8"]);
        assert_eq!(tasks[2].created_at.to_rfc3339(), "2026-10-14T06:00:00+00:00");
    }

    #[test]
    fn non_utf8_payload_is_discarded() {
        let store = MemoryStore::new().with_entry("todos", vec![0xff, 0xfe, b'[', b']']);
        assert!(StoredTasks::new(&store, "todos", Utc).tasks().unwrap().is_empty());

        let inside_string = b"[{\"id\": 1, \"text\": \"\xff\", \"createdAt\": 0, \"expired\": true}]";
        assert!(parse_payload("todos", inside_string, &Utc).is_empty());
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(HistoryError::StoreIo {
                path: "/store/todos.json".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    #[test]
    fn failing_store_read_still_yields_samples() {
        let store = BrokenStore;
        let stored = StoredTasks::new(&store, "todos", Utc);
        assert!(stored.tasks().unwrap().is_empty());

        let source = MergedSource::new()
            .with(stored)
            .with(SampleTasks::anchored_at(now()));
        assert_eq!(ids(&source.tasks().unwrap()), ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn merged_source_puts_stored_tasks_first() {
        let payload = r#"[{"id": 99, "text": "mine", "createdAt": "2026-10-14T10:00:00Z", "expired": true}]"#;
        let store = MemoryStore::new().with_entry("todos", payload);
        let source = MergedSource::new()
            .with(StoredTasks::new(&store, "todos", Utc))
            .with(SampleTasks::anchored_at(now()));
        assert_eq!(source.len(), 2);
        assert_eq!(ids(&source.tasks().unwrap()), ["99", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn corrupt_payload_still_yields_samples() {
        let store = MemoryStore::new().with_entry("todos", "][");
        let source = MergedSource::new()
            .with(StoredTasks::new(&store, "todos", Utc))
            .with(SampleTasks::anchored_at(now()));
        assert_eq!(ids(&source.tasks().unwrap()), ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn empty_merged_source_has_no_tasks() {
        let source = MergedSource::new();
        assert!(source.is_empty());
        assert!(source.tasks().unwrap().is_empty());
    }
}
