use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::{JsonFile, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "lastUsage", default, deserialize_with = "epoch_seconds")]
    pub last_usage: i64,
    #[serde(default)]
    pub count: u64,
}

pub type History = BTreeMap<String, HistoryEntry>;

pub fn now_unix_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Entries that fail to decode are skipped one by one.
fn decode(raw: BTreeMap<String, serde_json::Value>) -> History {
    raw.into_iter()
        .filter_map(|(hexcode, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((hexcode, entry)),
            Err(err) => {
                warn!(%hexcode, %err, "skipping malformed history entry");
                None
            }
        })
        .collect()
}

// Older history files stored fractional seconds.
fn epoch_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(value as i64)
}

#[derive(Debug)]
pub struct HistoryStore {
    file: JsonFile,
    cache: Option<History>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
            cache: None,
        }
    }

    pub fn read(&mut self) -> &History {
        let file = &self.file;
        self.cache.get_or_insert_with(|| decode(file.read()))
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn contains(&mut self, hexcode: &str) -> bool {
        self.read().contains_key(hexcode)
    }

    pub fn last_usage(&mut self, hexcode: &str) -> Option<i64> {
        self.read().get(hexcode).map(|entry| entry.last_usage)
    }

    pub fn increment(&mut self, hexcode: &str) -> Result<HistoryEntry, StoreError> {
        self.increment_at(hexcode, now_unix_secs())
    }

    /// Read-modify-write of the backing file. The cache only moves forward
    /// once the write succeeded.
    pub fn increment_at(&mut self, hexcode: &str, now: i64) -> Result<HistoryEntry, StoreError> {
        let mut history = decode(self.file.read_for_update()?);
        let entry = history
            .entry(hexcode.to_string())
            .or_insert(HistoryEntry {
                last_usage: now,
                count: 0,
            });
        entry.last_usage = now;
        entry.count += 1;
        let updated = *entry;

        self.file.write(&history)?;
        debug!(hexcode, count = updated.count, "usage recorded");
        self.cache = Some(history);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_creates_then_bumps_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::new(tmp.path().join("history.json"));

        let first = store.increment_at("1F600", 100).unwrap();
        assert_eq!(first, HistoryEntry { last_usage: 100, count: 1 });

        let second = store.increment_at("1F600", 250).unwrap();
        assert_eq!(second, HistoryEntry { last_usage: 250, count: 2 });
        assert_eq!(store.last_usage("1F600"), Some(250));
        assert!(!store.contains("1F44B"));
    }

    #[test]
    fn file_uses_last_usage_key() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        let mut store = HistoryStore::new(&path);
        store.increment_at("1F600", 42).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"1F600":{"lastUsage":42,"count":1}}"#);
    }

    #[test]
    fn fractional_timestamps_are_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, r#"{"1F44D":{"lastUsage":1700000000.75,"count":3}}"#).unwrap();

        let mut store = HistoryStore::new(&path);
        assert_eq!(store.last_usage("1F44D"), Some(1_700_000_000));
        assert_eq!(store.read()["1F44D"].count, 3);
    }

    #[test]
    fn incomplete_entries_survive_an_increment() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(
            &path,
            r#"{"1F600":{"lastUsage":100,"count":7},"1F44B":{"count":2},"1F602":"junk"}"#,
        )
        .unwrap();

        let mut store = HistoryStore::new(&path);
        assert_eq!(store.read().len(), 2);
        assert_eq!(store.last_usage("1F44B"), Some(0));

        store.increment_at("1F436", 200).unwrap();

        let mut reloaded = HistoryStore::new(&path);
        let history = reloaded.read();
        assert_eq!(history["1F600"], HistoryEntry { last_usage: 100, count: 7 });
        assert_eq!(history["1F44B"], HistoryEntry { last_usage: 0, count: 2 });
        assert_eq!(history["1F436"], HistoryEntry { last_usage: 200, count: 1 });
    }

    #[test]
    fn malformed_file_is_kept_as_backup_on_increment() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let mut store = HistoryStore::new(&path);
        store.increment_at("1F600", 5).unwrap();

        let backup = tmp.path().join("history.json.bak");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "[1, 2");
        assert_eq!(store.read().len(), 1);
    }

    #[test]
    fn read_is_cached_until_invalidated() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        let mut store = HistoryStore::new(&path);
        assert!(store.read().is_empty());

        std::fs::write(&path, r#"{"1F600":{"lastUsage":1,"count":1}}"#).unwrap();
        assert!(store.read().is_empty());

        store.invalidate();
        assert!(store.contains("1F600"));
    }

    #[test]
    fn failed_write_keeps_previous_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        let mut store = HistoryStore::new(&path);
        store.increment_at("1F600", 10).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.increment_at("1F44B", 20).is_err());
        assert!(store.contains("1F600"));
        assert!(!store.contains("1F44B"));
    }
}
