use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

pub type LocaleTags = HashMap<String, Vec<String>>;

/// Tables shipped with the app. A file of the same name in the locale
/// directory takes precedence.
const BUNDLED_LOCALES: &[(&str, &str)] = &[("it", include_str!("../assets/locales/it.json"))];

#[derive(Deserialize)]
#[serde(untagged)]
enum LocaleFile {
    Map(LocaleTags),
    Records(Vec<LocaleRecord>),
}

#[derive(Deserialize)]
struct LocaleRecord {
    hexcode: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<LocaleFile> for LocaleTags {
    fn from(file: LocaleFile) -> Self {
        match file {
            LocaleFile::Map(map) => map,
            LocaleFile::Records(records) => records
                .into_iter()
                .map(|record| (record.hexcode, record.tags))
                .collect(),
        }
    }
}

/// Per-locale search tags read from `<dir>/<locale>.json` or the bundled
/// tables, loaded on first use and kept for the rest of the session.
#[derive(Debug)]
pub struct LocalizedTags {
    dir: PathBuf,
    tables: HashMap<String, LocaleTags>,
}

impl LocalizedTags {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tables: HashMap::new(),
        }
    }

    pub fn table(&mut self, locale: &str) -> &LocaleTags {
        if !self.tables.contains_key(locale) {
            let table = self.load(locale);
            self.tables.insert(locale.to_string(), table);
        }

        &self.tables[locale]
    }

    pub fn get(&mut self, locale: &str, hexcode: &str) -> &[String] {
        self.table(locale)
            .get(hexcode)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = BUNDLED_LOCALES
            .iter()
            .map(|(locale, _)| locale.to_string())
            .collect();

        if let Ok(entries) = std::fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        locales.push(stem.to_string());
                    }
                }
            }
        }

        locales.retain(|locale| locale != "en");
        locales.sort();
        locales.dedup();
        locales.insert(0, "en".to_string());
        locales
    }

    fn load(&self, locale: &str) -> LocaleTags {
        let path = self.dir.join(format!("{}.json", locale));
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => match bundled(locale) {
                Some(content) => content.to_string(),
                None => {
                    warn!(path = %path.display(), %err, "localized tags unavailable");
                    return LocaleTags::new();
                }
            },
        };

        match serde_json::from_str::<LocaleFile>(&content) {
            Ok(file) => {
                let table = LocaleTags::from(file);
                debug!(locale, entries = table.len(), "localized tags loaded");
                table
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed localized tags");
                LocaleTags::new()
            }
        }
    }
}

fn bundled(locale: &str) -> Option<&'static str> {
    BUNDLED_LOCALES
        .iter()
        .find(|(name, _)| *name == locale)
        .map(|(_, content)| *content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_map_and_record_layouts() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("it.json"),
            r#"{"1F600":["faccina","sorriso"]}"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("de.json"),
            r#"[{"hexcode":"1F600","tags":["gesicht","grinsen"]},{"hexcode":"1F44B"}]"#,
        )
        .unwrap();

        let mut tags = LocalizedTags::new(tmp.path());
        assert_eq!(tags.get("it", "1F600"), ["faccina", "sorriso"]);
        assert!(tags.get("it", "1F436").is_empty());
        assert_eq!(tags.get("de", "1F600"), ["gesicht", "grinsen"]);
        assert!(tags.get("de", "1F44B").is_empty());
    }

    #[test]
    fn missing_locale_degrades_to_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tags = LocalizedTags::new(tmp.path());
        assert!(tags.table("fr").is_empty());
        assert!(tags.get("fr", "1F600").is_empty());
    }

    #[test]
    fn available_locales_lists_json_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("it.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("da.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "").unwrap();

        std::fs::write(tmp.path().join("en.json"), "{}").unwrap();

        let tags = LocalizedTags::new(tmp.path());
        assert_eq!(tags.available_locales(), ["en", "da", "it"]);
    }

    #[test]
    fn bundled_table_is_used_without_locale_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tags = LocalizedTags::new(tmp.path().join("missing"));

        assert_eq!(tags.available_locales(), ["en", "it"]);
        assert!(tags.get("it", "1F436").contains(&"cane".to_string()));
        assert!(tags.table("it").len() > 500);
    }
}
