use crate::session::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Input the window feeds into [`crate::Picker::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyPress),
    ModifiersChanged(Modifiers),
    QueryChanged(String),
    EmojiPressed(usize),
    CategoryPressed(usize),
    VariantChosen { hexcode: String, variant: usize },
    CustomTagsAdded { hexcode: String, tags: String },
    Shown,
    HideRequested,
}

/// Work the window has to carry out after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FocusSearch,
    FocusEmoji(usize),
    FocusCategory(usize),
    OpenSkinTones(String),
    OpenTagEditor(String),
    OpenShortcuts,
    Toast(String),
    CopyToClipboard(String),
    Notify { title: String, body: String },
    Hide { iconify: bool },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// False lets the toolkit apply its default handling.
    pub handled: bool,
    pub effects: Vec<Effect>,
}

impl Outcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled(effects: Vec<Effect>) -> Self {
        Self {
            handled: true,
            effects,
        }
    }
}
