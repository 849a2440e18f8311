use smilecore_catalog::Category;

/// Number of trailing glyphs echoed in the selection hint.
const HINT_TAIL: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Search,
    /// Position within the visible list.
    Emoji(usize),
    /// Index within `Category::STRIP`.
    Category(usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Self::NONE
    };

    pub fn any(self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// Transient state of one show/hide cycle of the picker window.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    search_text: String,
    query: Option<String>,
    category: Option<Category>,
    category_index: usize,
    selection: Vec<String>,
    selected_ids: Vec<String>,
    pub modifiers: Modifiers,
    pub focus: Focus,
    hint: Option<String>,
}

impl SessionState {
    pub fn new(category: Category) -> Self {
        Self {
            category: Some(category),
            category_index: category.strip_index().unwrap_or(0),
            ..Self::default()
        }
    }

    /// Raw text of the search box.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn category_index(&self) -> usize {
        self.category_index
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected_ids
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn is_selected(&self, hexcode: &str) -> bool {
        self.selected_ids.iter().any(|id| id == hexcode)
    }

    pub fn selection_text(&self) -> String {
        self.selection.concat()
    }

    pub fn set_search_text(&mut self, text: String) {
        let trimmed = text.trim();
        self.query = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.search_text = text;
    }

    pub fn push_search_char(&mut self, ch: char) {
        let mut text = std::mem::take(&mut self.search_text);
        text.push(ch);
        self.set_search_text(text);
    }

    pub fn set_category(&mut self, index: usize, category: Category) {
        self.search_text.clear();
        self.query = None;
        self.category = Some(category);
        self.category_index = index;
    }

    pub fn set_hint(&mut self, hint: Option<String>) {
        self.hint = hint;
    }

    /// Returns false when `hexcode` is already part of the selection.
    pub fn push_selection(&mut self, glyph: String, hexcode: String) -> bool {
        if self.is_selected(&hexcode) {
            return false;
        }

        self.selection.push(glyph);
        self.selected_ids.push(hexcode);
        self.refresh_selection_hint();
        true
    }

    pub fn pop_selection(&mut self) -> Option<(String, String)> {
        let glyph = self.selection.pop()?;
        let hexcode = self.selected_ids.pop()?;
        self.refresh_selection_hint();
        Some((glyph, hexcode))
    }

    /// Visible-to-hidden transition. The category survives so the next
    /// show opens where the user left off.
    pub fn reset(&mut self) {
        self.search_text.clear();
        self.query = None;
        self.selection.clear();
        self.selected_ids.clear();
        self.modifiers = Modifiers::NONE;
        self.focus = Focus::Search;
        self.hint = None;
    }

    fn refresh_selection_hint(&mut self) {
        if self.selection.is_empty() {
            self.hint = None;
            return;
        }

        let tail_start = self.selection.len().saturating_sub(HINT_TAIL);
        self.hint = Some(format!("Selected: {}", self.selection[tail_start..].concat()));
    }
}
