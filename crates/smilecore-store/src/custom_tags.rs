use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{JsonFile, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTagEntry {
    #[serde(default)]
    pub tags: String,
}

pub type CustomTags = BTreeMap<String, CustomTagEntry>;

#[derive(Debug)]
pub struct CustomTagStore {
    file: JsonFile,
    cache: Option<CustomTags>,
}

impl CustomTagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
            cache: None,
        }
    }

    /// Tag string for `hexcode`, empty when none was saved. With `cached`
    /// unset the file is re-read first.
    pub fn get(&mut self, hexcode: &str, cached: bool) -> String {
        if !cached {
            self.invalidate();
        }

        self.all()
            .get(hexcode)
            .map(|entry| entry.tags.clone())
            .unwrap_or_default()
    }

    pub fn all(&mut self) -> &CustomTags {
        let file = &self.file;
        self.cache.get_or_insert_with(|| file.read())
    }

    /// The mapping as last loaded, without touching the file.
    pub fn cached(&self) -> Option<&CustomTags> {
        self.cache.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Appends `tags` to whatever is already stored, comma separated.
    pub fn set(&mut self, hexcode: &str, tags: &str) -> Result<(), StoreError> {
        self.update(|current| {
            let entry = current.entry(hexcode.to_string()).or_default();
            if entry.tags.is_empty() {
                entry.tags = tags.to_string();
            } else {
                entry.tags.push_str(", ");
                entry.tags.push_str(tags);
            }
            true
        })
        .map(|_| ())
    }

    /// Overwrites the stored tags, used when editing an existing entry.
    pub fn replace(&mut self, hexcode: &str, tags: &str) -> Result<(), StoreError> {
        self.update(|current| {
            current.entry(hexcode.to_string()).or_default().tags = tags.to_string();
            true
        })
        .map(|_| ())
    }

    pub fn delete_all(&mut self, hexcode: &str) -> Result<bool, StoreError> {
        self.update(|current| current.remove(hexcode).is_some())
    }

    fn update(
        &mut self,
        change: impl FnOnce(&mut CustomTags) -> bool,
    ) -> Result<bool, StoreError> {
        let mut current: CustomTags = self.file.read_for_update()?;
        if !change(&mut current) {
            return Ok(false);
        }

        self.file.write(&current)?;
        self.cache = Some(current);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CustomTagStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = CustomTagStore::new(tmp.path().join("custom_tags.json"));
        (tmp, store)
    }

    #[test]
    fn set_appends_instead_of_replacing() {
        let (_tmp, mut store) = store();
        store.set("1F600", "happy").unwrap();
        store.set("1F600", "joy").unwrap();
        assert_eq!(store.get("1F600", false), "happy, joy");
    }

    #[test]
    fn duplicates_are_kept() {
        let (_tmp, mut store) = store();
        store.set("1F600", "happy").unwrap();
        store.set("1F600", "happy").unwrap();
        assert_eq!(store.get("1F600", true), "happy, happy");
    }

    #[test]
    fn missing_identifier_is_empty() {
        let (_tmp, mut store) = store();
        assert_eq!(store.get("1F44B", false), "");
    }

    #[test]
    fn replace_overwrites() {
        let (_tmp, mut store) = store();
        store.set("1F600", "happy").unwrap();
        store.replace("1F600", "glad").unwrap();
        assert_eq!(store.get("1F600", false), "glad");
    }

    #[test]
    fn delete_all_reports_whether_entry_existed() {
        let (_tmp, mut store) = store();
        store.set("1F600", "happy").unwrap();
        assert!(store.delete_all("1F600").unwrap());
        assert!(!store.delete_all("1F600").unwrap());
        assert!(store.all().is_empty());
    }

    #[test]
    fn file_format_is_object_of_tag_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom_tags.json");
        let mut store = CustomTagStore::new(&path);
        store.set("1F600", "happy").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"1F600":{"tags":"happy"}}"#);
    }

    #[test]
    fn failed_write_keeps_previous_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom_tags.json");
        let mut store = CustomTagStore::new(&path);
        store.set("1F600", "happy").unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.set("1F600", "joy").is_err());
        assert!(store.replace("1F44B", "hello").is_err());
        assert_eq!(store.cached().unwrap()["1F600"].tags, "happy");
        assert!(!store.cached().unwrap().contains_key("1F44B"));
    }

    #[test]
    fn cached_get_does_not_see_external_edits() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom_tags.json");
        let mut store = CustomTagStore::new(&path);
        assert_eq!(store.get("1F600", true), "");

        std::fs::write(&path, r#"{"1F600":{"tags":"outside"}}"#).unwrap();
        assert_eq!(store.get("1F600", true), "");
        assert_eq!(store.get("1F600", false), "outside");
    }
}
