use std::cmp::Ordering;

use smilecore_catalog::{Category, EmojiRecord};
use smilecore_store::{CustomTags, History, LocaleTags};

/// Everything the filter and sort predicates may look at. Building one is
/// cheap; it only borrows the stores' cached maps.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub query: Option<&'a str>,
    pub category: Option<Category>,
    pub history: &'a History,
    pub custom_tags: &'a CustomTags,
    /// Tag table of the active locale; `None` when localized tags are off.
    pub localized: Option<&'a LocaleTags>,
    pub merge_english_tags: bool,
}

impl<'a> FilterContext<'a> {
    pub fn active_query(&self) -> Option<&'a str> {
        self.query.filter(|query| !query.is_empty())
    }

    fn custom_tags_of(&self, record: &EmojiRecord) -> Option<&'a str> {
        self.custom_tags
            .get(&record.hexcode)
            .map(|entry| entry.tags.as_str())
            .filter(|tags| !tags.is_empty())
    }
}

pub fn matches(record: &EmojiRecord, ctx: &FilterContext<'_>) -> bool {
    if let Some(query) = ctx.active_query() {
        if record.emoji == query {
            return true;
        }

        if let Some(tags) = ctx.custom_tags_of(record) {
            if tag_list_contains([tags], query) {
                return true;
            }
        }

        let builtin = || tag_list_contains(record.tags.iter().map(String::as_str), query);
        return match ctx.localized {
            None => builtin(),
            Some(table) => {
                let localized = table
                    .get(&record.hexcode)
                    .is_some_and(|tags| tag_list_contains(tags.iter().map(String::as_str), query));
                localized || (ctx.merge_english_tags && builtin())
            }
        };
    }

    match ctx.category {
        Some(Category::Recents) => ctx.history.contains_key(&record.hexcode),
        Some(category) => record.group == category,
        None => false,
    }
}

pub fn compare(a: &EmojiRecord, b: &EmojiRecord, ctx: &FilterContext<'_>) -> Ordering {
    if ctx.category == Some(Category::Recents) {
        let last_a = ctx.history.get(&a.hexcode).map(|entry| entry.last_usage);
        let last_b = ctx.history.get(&b.hexcode).map(|entry| entry.last_usage);
        return match (last_a, last_b) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
    }

    if ctx.active_query().is_some() {
        let tagged_a = ctx.custom_tags_of(a).is_some();
        let tagged_b = ctx.custom_tags_of(b).is_some();
        return tagged_b.cmp(&tagged_a);
    }

    a.order.cmp(&b.order)
}

/// Indices into `records` of the visible emojis, in display order.
pub fn visible(records: &[EmojiRecord], ctx: &FilterContext<'_>) -> Vec<usize> {
    let mut shown: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches(record, ctx))
        .map(|(index, _)| index)
        .collect();

    shown.sort_by(|a, b| compare(&records[*a], &records[*b], ctx));
    shown
}

/// True when any comma separated token of `lists` contains `query`,
/// ignoring case.
pub fn tag_list_contains<'t>(lists: impl IntoIterator<Item = &'t str>, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    lists
        .into_iter()
        .flat_map(|list| list.split(','))
        .any(|token| contains_case_insensitive(token.trim(), &needle))
}

pub fn contains_case_insensitive(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }

    if haystack.is_ascii() && needle_lower.is_ascii() {
        let h = haystack.as_bytes();
        let n = needle_lower.as_bytes();
        return n.len() <= h.len()
            && h.windows(n.len())
                .any(|window| window.iter().zip(n).all(|(a, b)| a.to_ascii_lowercase() == *b));
    }

    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use smilecore_store::{CustomTagEntry, HistoryEntry};

    use super::*;

    fn record(hexcode: &str, emoji: &str, group: Category, order: u32, tags: &[&str]) -> EmojiRecord {
        EmojiRecord {
            hexcode: hexcode.to_string(),
            emoji: emoji.to_string(),
            group,
            order,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            skintones: Vec::new(),
        }
    }

    fn sample() -> Vec<EmojiRecord> {
        vec![
            record("1F600", "😀", Category::SmileysEmotion, 1, &["grin", "face"]),
            record("1F602", "😂", Category::SmileysEmotion, 2, &["joy", "laugh"]),
            record("1F44B", "👋", Category::PeopleBody, 3, &["wave", "hand"]),
            record("1F436", "🐶", Category::AnimalsNature, 4, &["dog", "face"]),
        ]
    }

    fn ctx<'a>(
        query: Option<&'a str>,
        category: Option<Category>,
        history: &'a History,
        custom_tags: &'a CustomTags,
    ) -> FilterContext<'a> {
        FilterContext {
            query,
            category,
            history,
            custom_tags,
            localized: None,
            merge_english_tags: false,
        }
    }

    fn tagged(pairs: &[(&str, &str)]) -> CustomTags {
        pairs
            .iter()
            .map(|(id, tags)| (id.to_string(), CustomTagEntry { tags: tags.to_string() }))
            .collect()
    }

    #[test]
    fn tag_list_contains_matches_token_substrings() {
        assert!(tag_list_contains(["grin, face"], "FA"));
        assert!(tag_list_contains(["grin", "face"], "grin"));
        assert!(!tag_list_contains(["grin, face"], "dog"));
        assert!(!tag_list_contains(["grin, face"], "  "));
        assert!(tag_list_contains(["Gesicht, Lächeln"], "lächeln"));
    }

    #[test]
    fn query_matches_glyph_and_builtin_tags() {
        let records = sample();
        let history = History::new();
        let custom = CustomTags::new();

        let by_glyph = ctx(Some("👋"), None, &history, &custom);
        assert_eq!(visible(&records, &by_glyph), vec![2]);

        let by_tag = ctx(Some("face"), None, &history, &custom);
        assert_eq!(visible(&records, &by_tag), vec![0, 3]);
    }

    #[test]
    fn query_ignores_category() {
        let records = sample();
        let history = History::new();
        let custom = CustomTags::new();

        for category in [None, Some(Category::PeopleBody), Some(Category::Recents)] {
            let c = ctx(Some("joy"), category, &history, &custom);
            let shown: Vec<bool> = records.iter().map(|r| matches(r, &c)).collect();
            assert_eq!(shown, vec![false, true, false, false]);
        }
    }

    #[test]
    fn filter_is_deterministic() {
        let records = sample();
        let history = History::new();
        let custom = tagged(&[("1F436", "puppy")]);
        let c = ctx(Some("pup"), Some(Category::SmileysEmotion), &history, &custom);

        let first: Vec<bool> = records.iter().map(|r| matches(r, &c)).collect();
        let second: Vec<bool> = records.iter().map(|r| matches(r, &c)).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![false, false, false, true]);
    }

    #[test]
    fn category_filters_by_group() {
        let records = sample();
        let history = History::new();
        let custom = CustomTags::new();
        let c = ctx(None, Some(Category::SmileysEmotion), &history, &custom);
        assert_eq!(visible(&records, &c), vec![0, 1]);
    }

    #[test]
    fn no_query_and_no_category_shows_nothing() {
        let records = sample();
        let history = History::new();
        let custom = CustomTags::new();
        let c = ctx(None, None, &history, &custom);
        assert!(visible(&records, &c).is_empty());

        let empty_query = ctx(Some(""), None, &history, &custom);
        assert!(visible(&records, &empty_query).is_empty());
    }

    #[test]
    fn recents_sort_newest_first_and_unseen_last() {
        let records = vec![
            record("C", "c", Category::SmileysEmotion, 1, &[]),
            record("B", "b", Category::SmileysEmotion, 2, &[]),
            record("A", "a", Category::SmileysEmotion, 3, &[]),
        ];
        let mut history = History::new();
        history.insert("A".to_string(), HistoryEntry { last_usage: 100, count: 1 });
        history.insert("B".to_string(), HistoryEntry { last_usage: 50, count: 4 });
        let custom = CustomTags::new();
        let c = ctx(None, Some(Category::Recents), &history, &custom);

        let mut order: Vec<&EmojiRecord> = records.iter().collect();
        order.sort_by(|a, b| compare(a, b, &c));
        let ids: Vec<&str> = order.iter().map(|r| r.hexcode.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);

        // Only records with history pass the recents filter.
        assert_eq!(visible(&records, &c), vec![2, 1]);
    }

    #[test]
    fn custom_tagged_records_lead_query_results() {
        let records = sample();
        let history = History::new();
        let custom = tagged(&[("1F436", "fluffy face")]);
        let c = ctx(Some("face"), None, &history, &custom);
        assert_eq!(visible(&records, &c), vec![3, 0]);
    }

    #[test]
    fn default_sort_uses_rank() {
        let records = vec![
            record("1F602", "😂", Category::SmileysEmotion, 9, &[]),
            record("1F600", "😀", Category::SmileysEmotion, 1, &[]),
        ];
        let history = History::new();
        let custom = CustomTags::new();
        let c = ctx(None, Some(Category::SmileysEmotion), &history, &custom);
        assert_eq!(visible(&records, &c), vec![1, 0]);
    }

    #[test]
    fn localized_tags_replace_or_merge_with_builtin() {
        let records = sample();
        let history = History::new();
        let custom = CustomTags::new();
        let mut table = LocaleTags::new();
        table.insert("1F436".to_string(), vec!["cane".to_string()]);

        let mut c = ctx(Some("cane"), None, &history, &custom);
        c.localized = Some(&table);
        assert_eq!(visible(&records, &c), vec![3]);

        c.query = Some("dog");
        assert!(visible(&records, &c).is_empty());

        c.merge_english_tags = true;
        assert_eq!(visible(&records, &c), vec![3]);
    }
}
