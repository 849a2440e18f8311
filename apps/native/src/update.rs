use std::time::Instant;

use iced::Task;
use smilecore_config::{SettingKey, SettingValue};
use smilecore_picker::{Effect, Event, Focus, Key};
use smilecore_shell::{Activations, ShellActions};
use tracing::{debug, warn};

use crate::hotkey::{parse_accelerator, GlobalShortcut};
use crate::{windowing, App, Message, Overlay, TagEdit, HOTKEY_RETRY_DELAY, TOAST_DURATION};

pub(crate) fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::QueryChanged(text) => app.dispatch(Event::QueryChanged(text)),
        Message::EmojiPressed(position) => app.dispatch(Event::EmojiPressed(position)),
        Message::CategoryPressed(index) => app.dispatch(Event::CategoryPressed(index)),
        Message::VariantChosen { hexcode, variant } => {
            app.overlay = None;
            app.dispatch(Event::VariantChosen { hexcode, variant })
        }
        Message::ModifiersChanged(modifiers) => {
            app.picker.handle(Event::ModifiersChanged(modifiers));
            Task::none()
        }
        Message::KeyPressed(press) => {
            if !app.visible {
                return Task::none();
            }

            if app.overlay.is_some() {
                if press.key == Key::Escape {
                    return app.close_overlay();
                }
                return Task::none();
            }

            app.dispatch(Event::Key(press))
        }
        Message::CloseRequested => app.dispatch(Event::HideRequested),
        Message::PollExternal => app.poll_external(),
        Message::OpenSettings => {
            app.hotkey_draft = app.picker.settings().hotkey.clone();
            app.overlay = Some(Overlay::Settings {
                editing: None,
                locales: app.picker.available_locales(),
            });
            windowing::release_input_focus(app.grid_scroll_id.clone())
        }
        Message::CloseOverlay => app.close_overlay(),
        Message::TagDraftChanged(text) => {
            if let Some(Overlay::TagEditor { draft, .. }) = &mut app.overlay {
                *draft = text;
            }
            Task::none()
        }
        Message::TagDraftSubmitted => {
            let Some(Overlay::TagEditor { hexcode, draft }) = app.overlay.take() else {
                return Task::none();
            };

            let task = app.dispatch(Event::CustomTagsAdded {
                hexcode,
                tags: draft,
            });
            Task::batch(vec![task, app.restore_focus()])
        }
        Message::SettingChanged(value) => {
            app.apply_setting(value);
            Task::none()
        }
        Message::HotkeyDraftChanged(text) => {
            app.hotkey_draft = text;
            Task::none()
        }
        Message::HotkeySubmitted => {
            app.rebind_shortcut();
            Task::none()
        }
        Message::EditCustomTags(hexcode) => {
            if let Some(Overlay::Settings { editing, .. }) = &mut app.overlay {
                let draft = app
                    .picker
                    .custom_tags()
                    .get(&hexcode)
                    .map(|entry| entry.tags.clone())
                    .unwrap_or_default();
                *editing = Some(TagEdit { hexcode, draft });
            }
            Task::none()
        }
        Message::CustomTagsDraftChanged(text) => {
            if let Some(Overlay::Settings {
                editing: Some(edit),
                ..
            }) = &mut app.overlay
            {
                edit.draft = text;
            }
            Task::none()
        }
        Message::SaveCustomTags => {
            let Some(Overlay::Settings { editing, .. }) = &mut app.overlay else {
                return Task::none();
            };
            let Some(edit) = editing.take() else {
                return Task::none();
            };

            let tags = edit.draft.trim();
            let saved = if tags.is_empty() {
                app.picker.delete_custom_tags(&edit.hexcode).map(|_| ())
            } else {
                app.picker.replace_custom_tags(&edit.hexcode, tags)
            };
            if let Err(err) = saved {
                warn!(%err, hexcode = edit.hexcode, "failed to save custom tags");
                app.show_toast("Could not save custom tags");
            }
            Task::none()
        }
        Message::DeleteCustomTags(hexcode) => {
            if let Err(err) = app.picker.delete_custom_tags(&hexcode) {
                warn!(%err, hexcode, "failed to delete custom tags");
                app.show_toast("Could not delete custom tags");
            }
            Task::none()
        }
    }
}

impl App {
    pub(crate) fn present(&mut self) -> Task<Message> {
        self.visible = true;
        self.overlay = None;

        let outcome = self.picker.handle(Event::Shown);
        Task::batch(vec![windowing::show_window(), self.run_effects(outcome.effects)])
    }

    fn dispatch(&mut self, event: Event) -> Task<Message> {
        let outcome = self.picker.handle(event);
        self.run_effects(outcome.effects)
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Task<Message> {
        let mut tasks = Vec::new();

        for effect in effects {
            match effect {
                Effect::FocusSearch => {
                    tasks.push(windowing::keep_search_input_focus(self.search_input_id.clone()));
                }
                Effect::FocusEmoji(position) => {
                    let columns = self.picker.columns();
                    let rows = self.picker.visible().len().div_ceil(columns);
                    tasks.push(windowing::release_input_focus(self.grid_scroll_id.clone()));
                    tasks.push(windowing::sync_grid_scroll(
                        self.grid_scroll_id.clone(),
                        position / columns,
                        rows,
                    ));
                }
                Effect::FocusCategory(_) => {
                    tasks.push(windowing::release_input_focus(self.grid_scroll_id.clone()));
                }
                Effect::OpenSkinTones(hexcode) => {
                    self.overlay = Some(Overlay::SkinTones(hexcode));
                }
                Effect::OpenTagEditor(hexcode) => {
                    self.overlay = Some(Overlay::TagEditor {
                        hexcode,
                        draft: String::new(),
                    });
                    tasks.push(windowing::focus_input(self.tag_input_id.clone()));
                }
                Effect::OpenShortcuts => {
                    self.overlay = Some(Overlay::Shortcuts);
                    tasks.push(windowing::release_input_focus(self.grid_scroll_id.clone()));
                }
                Effect::Toast(text) => self.show_toast(&text),
                Effect::CopyToClipboard(text) => match self.shell.copy_text(&text) {
                    Ok(()) => debug!(chars = text.chars().count(), "copied to clipboard"),
                    Err(err) => warn!(%err, "failed to copy to clipboard"),
                },
                Effect::Notify { title, body } => {
                    if let Err(err) = self.shell.notify(&title, &body) {
                        warn!(%err, "failed to send notification");
                    }
                }
                Effect::Hide { iconify } => {
                    self.visible = false;
                    self.overlay = None;
                    self.toast = None;
                    tasks.push(windowing::hide_window(iconify));
                }
            }
        }

        Task::batch(tasks)
    }

    fn close_overlay(&mut self) -> Task<Message> {
        self.overlay = None;
        self.restore_focus()
    }

    fn restore_focus(&self) -> Task<Message> {
        match self.picker.session().focus {
            Focus::Search => windowing::keep_search_input_focus(self.search_input_id.clone()),
            Focus::Emoji(_) | Focus::Category(_) => {
                windowing::release_input_focus(self.grid_scroll_id.clone())
            }
        }
    }

    fn show_toast(&mut self, text: &str) {
        self.toast = Some((text.to_string(), Instant::now() + TOAST_DURATION));
    }

    fn poll_external(&mut self) -> Task<Message> {
        if self
            .toast
            .as_ref()
            .is_some_and(|(_, until)| Instant::now() >= *until)
        {
            self.toast = None;
        }

        if self.shortcut.is_none() {
            let should_retry = self
                .shortcut_retry_at
                .is_none_or(|due| Instant::now() >= due);
            if should_retry {
                match GlobalShortcut::register(&self.picker.settings().hotkey) {
                    Ok(shortcut) => {
                        self.shortcut = Some(shortcut);
                        self.shortcut_retry_at = None;
                    }
                    Err(err) => {
                        debug!(%err, "global shortcut retry failed");
                        self.shortcut_retry_at = Some(Instant::now() + HOTKEY_RETRY_DELAY);
                    }
                }
            }
        }

        if self
            .activations
            .as_ref()
            .is_some_and(Activations::take_pending)
        {
            return self.present();
        }

        let toggled = self
            .shortcut
            .as_ref()
            .is_some_and(GlobalShortcut::pressed);
        if !toggled {
            return Task::none();
        }

        if self.visible {
            self.dispatch(Event::HideRequested)
        } else {
            self.present()
        }
    }

    fn apply_setting(&mut self, value: SettingValue) {
        let autostart = match value {
            SettingValue::LoadHiddenOnStartup(enabled) => Some(enabled),
            _ => None,
        };

        match self.picker.apply_setting(value) {
            Ok(Some(SettingKey::LoadHiddenOnStartup)) => {
                if let Some(enabled) = autostart {
                    if let Err(err) = self.shell.set_autostart(enabled) {
                        warn!(%err, enabled, "failed to update autostart");
                        self.show_toast("Could not update autostart");
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "failed to save settings");
                self.show_toast("Could not save settings");
            }
        }
    }

    fn rebind_shortcut(&mut self) {
        let accelerator = self.hotkey_draft.trim().to_string();
        if let Err(err) = parse_accelerator(&accelerator) {
            warn!(%err, "rejected shortcut");
            self.show_toast("Invalid shortcut");
            return;
        }

        if let Some(shortcut) = &mut self.shortcut {
            if let Err(err) = shortcut.rebind(&accelerator) {
                warn!(%err, "failed to register shortcut");
                self.show_toast("Shortcut already in use");
                return;
            }
        }

        self.apply_setting(SettingValue::Hotkey(accelerator));
    }
}
