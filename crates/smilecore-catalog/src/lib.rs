use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub type Hexcode = String;

const BUNDLED_CATALOG: &str = include_str!("../assets/emojis.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Recents,
    SmileysEmotion,
    PeopleBody,
    AnimalsNature,
    FoodDrink,
    TravelPlaces,
    Activities,
    Objects,
    Symbols,
    Flags,
    Component,
    #[serde(other)]
    Other,
}

impl Category {
    /// Categories shown in the picker strip, in display order.
    pub const STRIP: [Category; 10] = [
        Category::Recents,
        Category::SmileysEmotion,
        Category::PeopleBody,
        Category::AnimalsNature,
        Category::FoodDrink,
        Category::TravelPlaces,
        Category::Activities,
        Category::Objects,
        Category::Symbols,
        Category::Flags,
    ];

    pub const COUNT: usize = Self::STRIP.len();

    pub fn at(index: usize) -> Option<Category> {
        Self::STRIP.get(index).copied()
    }

    pub fn strip_index(self) -> Option<usize> {
        Self::STRIP.iter().position(|c| *c == self)
    }

    pub fn icon(self) -> Option<&'static str> {
        match self {
            Self::Recents => Some("🕖"),
            Self::SmileysEmotion => Some("😀"),
            Self::PeopleBody => Some("👋"),
            Self::AnimalsNature => Some("🐻"),
            Self::FoodDrink => Some("🍔"),
            Self::TravelPlaces => Some("🚗"),
            Self::Activities => Some("⚽"),
            Self::Objects => Some("💡"),
            Self::Symbols => Some("🔣"),
            Self::Flags => Some("🏳"),
            Self::Component | Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinTone {
    pub hexcode: Hexcode,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiRecord {
    pub hexcode: Hexcode,
    pub emoji: String,
    pub group: Category,
    pub order: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub skintones: Vec<SkinTone>,
}

impl EmojiRecord {
    pub fn has_skintones(&self) -> bool {
        !self.skintones.is_empty()
    }

    /// Glyph shown on the button for the configured skin tone modifier
    /// (`""` or a hex suffix such as `1F3FD`).
    pub fn display_glyph(&self, modifier: &str) -> &str {
        self.skintone_for(modifier)
            .map(|tone| tone.emoji.as_str())
            .unwrap_or(self.emoji.as_str())
    }

    pub fn skintone_for(&self, modifier: &str) -> Option<&SkinTone> {
        if modifier.is_empty() {
            return None;
        }

        let suffix = format!("-{}", modifier);
        self.skintones
            .iter()
            .find(|tone| tone.hexcode.contains(&suffix))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate emoji identifier {0}")]
    Duplicate(Hexcode),
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<EmojiRecord>,
    by_hexcode: HashMap<Hexcode, usize>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let records: Vec<EmojiRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<EmojiRecord>) -> Result<Self, CatalogError> {
        let mut by_hexcode = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if by_hexcode.insert(record.hexcode.clone(), index).is_some() {
                return Err(CatalogError::Duplicate(record.hexcode.clone()));
            }
        }

        Ok(Self {
            records,
            by_hexcode,
        })
    }

    pub fn records(&self) -> &[EmojiRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&EmojiRecord> {
        self.records.get(index)
    }

    pub fn by_hexcode(&self, hexcode: &str) -> Option<&EmojiRecord> {
        self.by_hexcode
            .get(hexcode)
            .and_then(|index| self.records.get(*index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.is_empty());
        let grin = catalog.by_hexcode("1F600").unwrap();
        assert_eq!(grin.emoji, "😀");
        assert_eq!(grin.group, Category::SmileysEmotion);
    }

    #[test]
    fn bundled_catalog_fills_every_category() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.len() > 1800);

        for category in &Category::STRIP[1..] {
            let count = catalog
                .records()
                .iter()
                .filter(|record| record.group == *category)
                .count();
            assert!(count >= 50, "{:?} has only {} records", category, count);
        }

        let toned = catalog.records().iter().filter(|r| r.has_skintones()).count();
        assert!(toned > 300);
        let thumbs = catalog.by_hexcode("1F44D").unwrap();
        assert_eq!(thumbs.skintones.len(), 5);
    }

    #[test]
    fn display_glyph_follows_modifier() {
        let catalog = Catalog::bundled().unwrap();
        let wave = catalog.by_hexcode("1F44B").unwrap();
        assert_eq!(wave.display_glyph(""), "👋");
        assert_eq!(wave.display_glyph("1F3FD"), "👋🏽");

        let grin = catalog.by_hexcode("1F600").unwrap();
        assert_eq!(grin.display_glyph("1F3FD"), "😀");
    }

    #[test]
    fn unknown_group_maps_to_other() {
        let catalog = Catalog::from_json(
            r##"[{"hexcode":"0023-FE0F-20E3","emoji":"#️⃣","group":"keycaps","order":1}]"##,
        )
        .unwrap();
        assert_eq!(catalog.records()[0].group, Category::Other);
        assert!(catalog.records()[0].tags.is_empty());
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let err = Catalog::from_json(
            r#"[{"hexcode":"1F600","emoji":"😀","group":"smileys-emotion","order":1},
                {"hexcode":"1F600","emoji":"😀","group":"smileys-emotion","order":2}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(code) if code == "1F600"));
    }

    #[test]
    fn strip_index_round_trips_through_at() {
        assert_eq!(Category::COUNT, 10);
        assert_eq!(Category::at(0), Some(Category::Recents));
        assert_eq!(Category::SmileysEmotion.strip_index(), Some(1));
        assert_eq!(Category::Component.strip_index(), None);
        assert_eq!(Category::at(Category::COUNT), None);
    }
}
