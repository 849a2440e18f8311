use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const APP_DIR: &str = "smile";
pub const SETTINGS_FILE: &str = "settings.json";

/// Skin tone modifiers offered by the settings page, with a preview glyph.
pub const SKINTONE_MODIFIERS: [(&str, &str); 6] = [
    ("", "👋"),
    ("1F3FB", "👋🏻"),
    ("1F3FC", "👋🏼"),
    ("1F3FD", "👋🏽"),
    ("1F3FE", "👋🏾"),
    ("1F3FF", "👋🏿"),
];

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub iconify_on_esc: bool,
    pub is_first_run: bool,
    pub use_localized_tags: bool,
    pub merge_english_tags: bool,
    pub tags_locale: String,
    pub skintone_modifier: String,
    pub emoji_size_class: EmojiSize,
    pub load_hidden_on_startup: bool,
    pub open_on_mouse_position: bool,
    pub hotkey: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            iconify_on_esc: false,
            is_first_run: true,
            use_localized_tags: false,
            merge_english_tags: false,
            tags_locale: "en".to_string(),
            skintone_modifier: String::new(),
            emoji_size_class: EmojiSize::Default,
            load_hidden_on_startup: false,
            open_on_mouse_position: false,
            hotkey: "ctrl+alt+Period".to_string(),
        }
    }
}

impl Settings {
    /// Locale whose tag table should be consulted, if any.
    pub fn localized_tags_locale(&self) -> Option<&str> {
        if self.use_localized_tags && self.tags_locale != "en" {
            Some(self.tags_locale.as_str())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmojiSize {
    #[default]
    #[serde(rename = "emoji-button")]
    Default,
    #[serde(rename = "emoji-button-lg")]
    Big,
    #[serde(rename = "emoji-button-xl")]
    Bigger,
    #[serde(rename = "emoji-button-xxl")]
    Giant,
}

impl EmojiSize {
    pub const ALL: [EmojiSize; 4] = [Self::Default, Self::Big, Self::Bigger, Self::Giant];

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Big => "Big",
            Self::Bigger => "Bigger",
            Self::Giant => "Giant",
        }
    }
}

impl std::fmt::Display for EmojiSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    IconifyOnEsc,
    IsFirstRun,
    UseLocalizedTags,
    MergeEnglishTags,
    TagsLocale,
    SkintoneModifier,
    EmojiSizeClass,
    LoadHiddenOnStartup,
    OpenOnMousePosition,
    Hotkey,
}

impl SettingKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::IconifyOnEsc => "iconify-on-esc",
            Self::IsFirstRun => "is-first-run",
            Self::UseLocalizedTags => "use-localized-tags",
            Self::MergeEnglishTags => "merge-english-tags",
            Self::TagsLocale => "tags-locale",
            Self::SkintoneModifier => "skintone-modifier",
            Self::EmojiSizeClass => "emoji-size-class",
            Self::LoadHiddenOnStartup => "load-hidden-on-startup",
            Self::OpenOnMousePosition => "open-on-mouse-position",
            Self::Hotkey => "hotkey",
        }
    }

    /// Keys whose change alters which emojis match a query.
    pub fn affects_filter(self) -> bool {
        matches!(
            self,
            Self::UseLocalizedTags | Self::MergeEnglishTags | Self::TagsLocale
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    IconifyOnEsc(bool),
    IsFirstRun(bool),
    UseLocalizedTags(bool),
    MergeEnglishTags(bool),
    TagsLocale(String),
    SkintoneModifier(String),
    EmojiSizeClass(EmojiSize),
    LoadHiddenOnStartup(bool),
    OpenOnMousePosition(bool),
    Hotkey(String),
}

impl SettingValue {
    pub fn key(&self) -> SettingKey {
        match self {
            Self::IconifyOnEsc(_) => SettingKey::IconifyOnEsc,
            Self::IsFirstRun(_) => SettingKey::IsFirstRun,
            Self::UseLocalizedTags(_) => SettingKey::UseLocalizedTags,
            Self::MergeEnglishTags(_) => SettingKey::MergeEnglishTags,
            Self::TagsLocale(_) => SettingKey::TagsLocale,
            Self::SkintoneModifier(_) => SettingKey::SkintoneModifier,
            Self::EmojiSizeClass(_) => SettingKey::EmojiSizeClass,
            Self::LoadHiddenOnStartup(_) => SettingKey::LoadHiddenOnStartup,
            Self::OpenOnMousePosition(_) => SettingKey::OpenOnMousePosition,
            Self::Hotkey(_) => SettingKey::Hotkey,
        }
    }

    fn apply(self, settings: &mut Settings) -> bool {
        fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        }

        match self {
            Self::IconifyOnEsc(v) => replace(&mut settings.iconify_on_esc, v),
            Self::IsFirstRun(v) => replace(&mut settings.is_first_run, v),
            Self::UseLocalizedTags(v) => replace(&mut settings.use_localized_tags, v),
            Self::MergeEnglishTags(v) => replace(&mut settings.merge_english_tags, v),
            Self::TagsLocale(v) => replace(&mut settings.tags_locale, v),
            Self::SkintoneModifier(v) => replace(&mut settings.skintone_modifier, v),
            Self::EmojiSizeClass(v) => replace(&mut settings.emoji_size_class, v),
            Self::LoadHiddenOnStartup(v) => replace(&mut settings.load_hidden_on_startup, v),
            Self::OpenOnMousePosition(v) => replace(&mut settings.open_on_mouse_position, v),
            Self::Hotkey(v) => replace(&mut settings.hotkey, v),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Settings backed by a JSON file. `set` reports which key changed so
/// callers can react the way a change notification would.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = read_settings(&path);
        Self { path, settings }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn set(&mut self, value: SettingValue) -> Result<Option<SettingKey>, ConfigError> {
        let key = value.key();
        let previous = self.settings.clone();
        if !value.apply(&mut self.settings) {
            return Ok(None);
        }

        if let Err(err) = self.save() {
            self.settings = previous;
            return Err(err);
        }

        debug!(key = key.name(), "setting changed");
        Ok(Some(key))
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

fn read_settings(path: &Path) -> Settings {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Settings::default();
    };

    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring malformed settings file");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(tmp.path().join(SETTINGS_FILE));
        assert_eq!(store.get(), &Settings::default());
        assert!(store.get().is_first_run);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        std::fs::write(
            &path,
            r#"{"iconify-on-esc": true, "emoji-size-class": "emoji-button-xl"}"#,
        )
        .unwrap();

        let store = SettingsStore::load(&path);
        assert!(store.get().iconify_on_esc);
        assert_eq!(store.get().emoji_size_class, EmojiSize::Bigger);
        assert_eq!(store.get().tags_locale, "en");
    }

    #[test]
    fn malformed_file_degrades_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"iconify-on-esc": "yes please"}"#).unwrap();

        let store = SettingsStore::load(&path);
        assert_eq!(store.get(), &Settings::default());
    }

    #[test]
    fn set_persists_and_reports_changed_key() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join(SETTINGS_FILE);
        let mut store = SettingsStore::load(&path);

        let changed = store.set(SettingValue::IsFirstRun(false)).unwrap();
        assert_eq!(changed, Some(SettingKey::IsFirstRun));

        let unchanged = store.set(SettingValue::IsFirstRun(false)).unwrap();
        assert_eq!(unchanged, None);

        let reloaded = SettingsStore::load(&path);
        assert!(!reloaded.get().is_first_run);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"is-first-run\": false"));
    }

    #[test]
    fn localized_locale_requires_toggle_and_non_english() {
        let mut settings = Settings::default();
        assert_eq!(settings.localized_tags_locale(), None);

        settings.use_localized_tags = true;
        assert_eq!(settings.localized_tags_locale(), None);

        settings.tags_locale = "it".to_string();
        assert_eq!(settings.localized_tags_locale(), Some("it"));
    }
}
