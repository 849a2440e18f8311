use smilecore_catalog::Category;

use crate::event::{Effect, Key, KeyPress, Outcome};
use crate::session::Focus;
use crate::{Picker, NO_SKINTONES_NOTICE};

impl Picker {
    /// Keyboard reducer. The first matching rule wins.
    pub(crate) fn dispatch_key(&mut self, press: KeyPress) -> Outcome {
        let KeyPress { key, modifiers } = press;
        let focus = self.session.focus;

        if key == Key::Escape {
            return Outcome::handled(self.hide());
        }

        if focus == Focus::Search && key == Key::Down {
            if self.visible.is_empty() {
                return Outcome::ignored();
            }
            return Outcome::handled(self.focus_emoji(0));
        }

        if modifiers.alt {
            return self.dispatch_alt(key, focus);
        }

        if modifiers.shift {
            if let Focus::Emoji(position) = focus {
                match key {
                    Key::Enter => {
                        if let Some(record) = self.visible_record(position) {
                            let glyph = self.display_glyph(record).to_string();
                            let hexcode = record.hexcode.clone();
                            self.select(glyph, hexcode);
                        }
                        return Outcome::handled(Vec::new());
                    }
                    Key::Backspace => {
                        self.session.pop_selection();
                        return Outcome::handled(Vec::new());
                    }
                    _ => {}
                }
            }
        }

        if modifiers.ctrl {
            return match key {
                Key::Char('?') => Outcome::handled(vec![Effect::OpenShortcuts]),
                Key::Char('/') if modifiers.shift => Outcome::handled(vec![Effect::OpenShortcuts]),
                Key::Enter if !self.session.selection().is_empty() => {
                    Outcome::handled(self.commit(None))
                }
                _ => Outcome::ignored(),
            };
        }

        match focus {
            Focus::Emoji(position) => self.dispatch_grid(key, position, modifiers.any()),
            Focus::Category(index) => self.dispatch_strip(key, index, modifiers.any()),
            Focus::Search => Outcome::ignored(),
        }
    }

    fn dispatch_alt(&mut self, key: Key, focus: Focus) -> Outcome {
        match (key, focus) {
            (Key::Char('e' | 'E'), Focus::Emoji(position)) => {
                let Some(record) = self.visible_record(position) else {
                    return Outcome::ignored();
                };
                let effect = if record.has_skintones() {
                    Effect::OpenSkinTones(record.hexcode.clone())
                } else {
                    Effect::Toast(NO_SKINTONES_NOTICE.to_string())
                };
                Outcome::handled(vec![effect])
            }
            (Key::Char('t' | 'T'), Focus::Emoji(position)) => match self.visible_record(position) {
                Some(record) => Outcome::handled(vec![Effect::OpenTagEditor(record.hexcode.clone())]),
                None => Outcome::ignored(),
            },
            (Key::Left, _) => {
                let index = self.session.category_index().saturating_sub(1);
                Outcome::handled(self.select_category(index))
            }
            (Key::Right, _) => {
                let index = (self.session.category_index() + 1).min(Category::COUNT - 1);
                Outcome::handled(self.select_category(index))
            }
            _ => Outcome::ignored(),
        }
    }

    fn dispatch_grid(&mut self, key: Key, position: usize, modified: bool) -> Outcome {
        let len = self.visible.len();
        let columns = self.columns;

        match key {
            Key::Enter if !modified => {
                let Some(record) = self.visible_record(position) else {
                    return Outcome::ignored();
                };
                let trailing = (self.display_glyph(record).to_string(), record.hexcode.clone());
                Outcome::handled(self.commit(Some(trailing)))
            }
            Key::Up if position < columns => {
                self.session.focus = Focus::Search;
                Outcome::handled(vec![Effect::FocusSearch])
            }
            Key::Up => Outcome::handled(self.focus_emoji(position - columns)),
            Key::Down if position + columns < len => {
                Outcome::handled(self.focus_emoji(position + columns))
            }
            Key::Down if len > 0 && position / columns < (len - 1) / columns => {
                Outcome::handled(self.focus_emoji(len - 1))
            }
            Key::Down => {
                let index = self.session.category_index();
                self.session.focus = Focus::Category(index);
                Outcome::handled(vec![Effect::FocusCategory(index)])
            }
            Key::Left => Outcome::handled(self.focus_emoji(position.saturating_sub(1))),
            Key::Right if position + 1 < len => Outcome::handled(self.focus_emoji(position + 1)),
            Key::Right => Outcome::handled(Vec::new()),
            Key::Char(ch) if !modified => self.resume_search(ch),
            _ => Outcome::ignored(),
        }
    }

    fn dispatch_strip(&mut self, key: Key, index: usize, modified: bool) -> Outcome {
        match key {
            Key::Up => {
                let mut effects = self.select_category(index);
                if !self.visible.is_empty() {
                    effects = self.focus_emoji(0);
                }
                Outcome::handled(effects)
            }
            Key::Enter => Outcome::handled(self.select_category(index)),
            Key::Left => Outcome::handled(self.focus_category(index.saturating_sub(1))),
            Key::Right => Outcome::handled(self.focus_category((index + 1).min(Category::COUNT - 1))),
            Key::Char(ch) if !modified => self.resume_search(ch),
            _ => Outcome::ignored(),
        }
    }

    fn resume_search(&mut self, ch: char) -> Outcome {
        if ch.is_whitespace() || ch.is_control() {
            return Outcome::ignored();
        }

        self.session.push_search_char(ch);
        self.session.focus = Focus::Search;
        self.refresh();
        Outcome::handled(vec![Effect::FocusSearch])
    }

    fn focus_emoji(&mut self, position: usize) -> Vec<Effect> {
        self.session.focus = Focus::Emoji(position);
        vec![Effect::FocusEmoji(position)]
    }

    fn focus_category(&mut self, index: usize) -> Vec<Effect> {
        self.session.focus = Focus::Category(index);
        vec![Effect::FocusCategory(index)]
    }
}
