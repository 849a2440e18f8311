//! Display-free picker window logic: session state, the keyboard reducer,
//! and the commit/hide actions. The GUI feeds [`Event`]s in and executes the
//! returned [`Effect`]s.

mod dispatch;
mod event;
mod session;

use std::path::Path;
use std::sync::Arc;

use smilecore_catalog::{Catalog, Category, EmojiRecord};
use smilecore_config::{ConfigError, SettingKey, SettingValue, Settings, SettingsStore};
use smilecore_query::FilterContext;
use smilecore_store::{
    CustomTagStore, CustomTags, HistoryStore, LocalizedTags, StoreError, CUSTOM_TAGS_FILE,
    HISTORY_FILE,
};
use tracing::{debug, warn};

pub use event::{Effect, Event, Key, KeyPress, Outcome};
pub use session::{Focus, Modifiers, SessionState};

pub const DEFAULT_COLUMNS: usize = 5;
pub const NO_SKINTONES_NOTICE: &str = "No skintones available";
const FIRST_COPY_TITLE: &str = "Copied!";
const FIRST_COPY_BODY: &str =
    "I have copied the emoji to the clipboard. You can now paste it in any input field.";
static NO_CUSTOM_TAGS: CustomTags = CustomTags::new();
const RECENTS_HINT: &str = "Recently used emojis";
const RECENTS_EMPTY_HINT: &str = "Whoa, it's still empty!\nYour most used emojis will show up here";

/// Persistent collaborators of the picker.
#[derive(Debug)]
pub struct Stores {
    pub settings: SettingsStore,
    pub history: HistoryStore,
    pub custom_tags: CustomTagStore,
    pub localized: LocalizedTags,
}

impl Stores {
    pub fn open(config_dir: &Path, locales_dir: &Path) -> Self {
        Self {
            settings: SettingsStore::load(config_dir.join(smilecore_config::SETTINGS_FILE)),
            history: HistoryStore::new(config_dir.join(HISTORY_FILE)),
            custom_tags: CustomTagStore::new(config_dir.join(CUSTOM_TAGS_FILE)),
            localized: LocalizedTags::new(locales_dir),
        }
    }
}

#[derive(Debug)]
pub struct Picker {
    catalog: Arc<Catalog>,
    settings: SettingsStore,
    history: HistoryStore,
    custom_tags: CustomTagStore,
    localized: LocalizedTags,
    session: SessionState,
    visible: Vec<usize>,
    columns: usize,
}

impl Picker {
    pub fn new(catalog: Arc<Catalog>, stores: Stores) -> Self {
        let mut picker = Self {
            catalog,
            settings: stores.settings,
            history: stores.history,
            custom_tags: stores.custom_tags,
            localized: stores.localized,
            session: SessionState::new(Category::SmileysEmotion),
            visible: Vec::new(),
            columns: DEFAULT_COLUMNS,
        };
        picker.refresh();
        picker
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Catalog indices of the shown emojis, in display order.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_record(&self, position: usize) -> Option<&EmojiRecord> {
        self.visible
            .get(position)
            .and_then(|index| self.catalog.get(*index))
    }

    pub fn display_glyph<'r>(&self, record: &'r EmojiRecord) -> &'r str {
        record.display_glyph(&self.settings.get().skintone_modifier)
    }

    /// Saved custom tags, as loaded by the last refresh.
    pub fn custom_tags(&self) -> &CustomTags {
        self.custom_tags.cached().unwrap_or(&NO_CUSTOM_TAGS)
    }

    pub fn available_locales(&self) -> Vec<String> {
        self.localized.available_locales()
    }

    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Key(press) => self.dispatch_key(press),
            Event::ModifiersChanged(modifiers) => {
                self.session.modifiers = modifiers;
                Outcome::ignored()
            }
            Event::QueryChanged(text) => {
                self.session.set_search_text(text);
                self.session.focus = Focus::Search;
                self.refresh();
                Outcome::handled(Vec::new())
            }
            Event::EmojiPressed(position) => {
                let Some(record) = self.visible_record(position) else {
                    return Outcome::ignored();
                };
                let glyph = self.display_glyph(record).to_string();
                let hexcode = record.hexcode.clone();

                self.session.focus = Focus::Emoji(position);
                if self.session.modifiers.shift {
                    self.select(glyph, hexcode);
                    Outcome::handled(Vec::new())
                } else {
                    Outcome::handled(self.commit(Some((glyph, hexcode))))
                }
            }
            Event::CategoryPressed(index) => Outcome::handled(self.select_category(index)),
            Event::VariantChosen { hexcode, variant } => {
                let Some(tone) = self
                    .catalog
                    .by_hexcode(&hexcode)
                    .and_then(|record| record.skintones.get(variant))
                else {
                    return Outcome::ignored();
                };
                let choice = (tone.emoji.clone(), tone.hexcode.clone());

                if self.session.modifiers.shift {
                    self.select(choice.0, choice.1);
                    Outcome::handled(Vec::new())
                } else {
                    Outcome::handled(self.commit(Some(choice)))
                }
            }
            Event::CustomTagsAdded { hexcode, tags } => {
                let tags = tags.trim();
                if !tags.is_empty() {
                    if let Err(err) = self.custom_tags.set(&hexcode, tags) {
                        warn!(%err, hexcode, "failed to save custom tags");
                    }
                    self.refresh();
                }
                Outcome::handled(Vec::new())
            }
            Event::Shown => {
                self.session.focus = Focus::Search;
                self.history.invalidate();
                self.refresh();
                Outcome::handled(vec![Effect::FocusSearch])
            }
            Event::HideRequested => Outcome::handled(self.hide()),
        }
    }

    pub fn apply_setting(&mut self, value: SettingValue) -> Result<Option<SettingKey>, ConfigError> {
        let changed = self.settings.set(value)?;
        if changed.is_some_and(SettingKey::affects_filter) {
            self.refresh();
        }
        Ok(changed)
    }

    pub fn replace_custom_tags(&mut self, hexcode: &str, tags: &str) -> Result<(), StoreError> {
        self.custom_tags.replace(hexcode, tags)?;
        self.refresh();
        Ok(())
    }

    pub fn delete_custom_tags(&mut self, hexcode: &str) -> Result<bool, StoreError> {
        let removed = self.custom_tags.delete_all(hexcode)?;
        if removed {
            self.refresh();
        }
        Ok(removed)
    }

    /// Recomputes the visible list from the session and the stores.
    pub fn refresh(&mut self) {
        let settings = self.settings.get();
        let locale = settings.localized_tags_locale();
        let merge_english_tags = settings.use_localized_tags && settings.merge_english_tags;

        let history = self.history.read();
        let custom_tags = self.custom_tags.all();
        let localized = match locale {
            Some(locale) => Some(self.localized.table(locale)),
            None => None,
        };

        let ctx = FilterContext {
            query: self.session.query(),
            category: self.session.category(),
            history,
            custom_tags,
            localized,
            merge_english_tags,
        };
        self.visible = smilecore_query::visible(self.catalog.records(), &ctx);

        if let Focus::Emoji(position) = self.session.focus {
            self.session.focus = match self.visible.len() {
                0 => Focus::Search,
                len => Focus::Emoji(position.min(len - 1)),
            };
        }

        debug!(
            query = ?self.session.query(),
            category = ?self.session.category(),
            shown = self.visible.len(),
            "emoji list refreshed"
        );
    }

    fn select_category(&mut self, index: usize) -> Vec<Effect> {
        let Some(category) = Category::at(index) else {
            return Vec::new();
        };

        self.session.set_category(index, category);
        self.session.focus = Focus::Category(index);

        if category == Category::Recents {
            let hint = if self.history.read().is_empty() {
                RECENTS_EMPTY_HINT
            } else {
                RECENTS_HINT
            };
            self.session.set_hint(Some(hint.to_string()));
        } else if self.session.selection().is_empty() {
            self.session.set_hint(None);
        }

        self.refresh();
        vec![Effect::FocusCategory(index)]
    }

    fn select(&mut self, glyph: String, hexcode: String) {
        if self.session.push_selection(glyph, hexcode.clone()) {
            self.record_usage(&hexcode);
        }
    }

    fn record_usage(&mut self, hexcode: &str) {
        if let Err(err) = self.history.increment(hexcode) {
            warn!(%err, hexcode, "failed to record emoji usage");
        }
    }

    /// Copies the selection plus `trailing`, records usage, then hides.
    fn commit(&mut self, trailing: Option<(String, String)>) -> Vec<Effect> {
        let mut text = self.session.selection_text();
        let mut used = self.session.selected_ids().to_vec();
        if let Some((glyph, hexcode)) = trailing {
            text.push_str(&glyph);
            used.push(hexcode);
        }

        let mut effects = vec![Effect::CopyToClipboard(text)];
        for hexcode in &used {
            self.record_usage(hexcode);
        }

        if self.settings.get().is_first_run {
            effects.push(Effect::Notify {
                title: FIRST_COPY_TITLE.to_string(),
                body: FIRST_COPY_BODY.to_string(),
            });
            if let Err(err) = self.settings.set(SettingValue::IsFirstRun(false)) {
                warn!(%err, "failed to persist first run flag");
            }
        }

        effects.extend(self.hide());
        effects
    }

    fn hide(&mut self) -> Vec<Effect> {
        let iconify = self.settings.get().iconify_on_esc;
        self.session.reset();
        self.refresh();
        vec![Effect::Hide { iconify }]
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use smilecore_catalog::SkinTone;

    use super::*;

    pub(crate) fn record(hexcode: &str, emoji: &str, group: Category, order: u32, tags: &[&str]) -> EmojiRecord {
        EmojiRecord {
            hexcode: hexcode.to_string(),
            emoji: emoji.to_string(),
            group,
            order,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            skintones: Vec::new(),
        }
    }

    /// Seven smileys (two grid rows at five columns), one hand with tones,
    /// one animal.
    pub(crate) fn catalog() -> Arc<Catalog> {
        let mut records = vec![
            record("1F600", "😀", Category::SmileysEmotion, 1, &["grin", "face"]),
            record("1F602", "😂", Category::SmileysEmotion, 2, &["joy", "laugh"]),
            record("1F609", "😉", Category::SmileysEmotion, 3, &["wink", "face"]),
            record("1F60D", "😍", Category::SmileysEmotion, 4, &["love", "heart"]),
            record("1F914", "🤔", Category::SmileysEmotion, 5, &["thinking"]),
            record("1F60E", "😎", Category::SmileysEmotion, 6, &["cool", "sunglasses"]),
            record("1F62D", "😭", Category::SmileysEmotion, 7, &["sob", "cry"]),
            record("1F44B", "👋", Category::PeopleBody, 8, &["wave", "hand"]),
            record("1F436", "🐶", Category::AnimalsNature, 9, &["dog", "face"]),
        ];
        records[7].skintones = vec![
            SkinTone {
                hexcode: "1F44B-1F3FB".to_string(),
                emoji: "👋🏻".to_string(),
            },
            SkinTone {
                hexcode: "1F44B-1F3FD".to_string(),
                emoji: "👋🏽".to_string(),
            },
        ];

        Arc::new(Catalog::from_records(records).unwrap())
    }

    pub(crate) fn picker() -> (tempfile::TempDir, Picker) {
        let tmp = tempfile::tempdir().unwrap();
        let stores = Stores::open(tmp.path(), &tmp.path().join("locales"));
        (tmp, Picker::new(catalog(), stores))
    }

    pub(crate) fn press(picker: &mut Picker, key: Key, modifiers: Modifiers) -> Outcome {
        picker.handle(Event::Key(KeyPress::new(key, modifiers)))
    }

    pub(crate) fn assert_aligned(picker: &Picker) {
        assert_eq!(
            picker.session().selection().len(),
            picker.session().selected_ids().len()
        );
    }
}
