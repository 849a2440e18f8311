use std::fmt;

use iced::alignment::Horizontal;
use iced::widget::{
    button, column, container, pick_list, row, scrollable, stack, text, text_input, toggler,
};
use iced::{Alignment, Color, Element, Fill, Length, Subscription, Theme};
use smilecore_catalog::Category;
use smilecore_config::{EmojiSize, SettingValue, SKINTONE_MODIFIERS};
use smilecore_picker::Focus;

use crate::{keymap, App, Message, Overlay, TagEdit, POLL_INTERVAL};

const SHORTCUTS: [(&str, &str); 9] = [
    ("Enter", "Copy the focused emoji and close"),
    ("Shift+Enter", "Add the focused emoji to the selection"),
    ("Shift+Backspace", "Remove the last selected emoji"),
    ("Ctrl+Enter", "Copy the selection and close"),
    ("Alt+E", "Show skin tones"),
    ("Alt+T", "Add custom tags"),
    ("Alt+Left / Alt+Right", "Previous / next category"),
    ("Ctrl+?", "Show this help"),
    ("Esc", "Close the picker"),
];

pub(crate) fn view(app: &App) -> Element<'_, Message> {
    let session = app.picker.session();

    let header = row![
        text_input("Search emojis", session.search_text())
            .id(app.search_input_id.clone())
            .on_input(Message::QueryChanged)
            .padding(8)
            .size(16)
            .width(Fill),
        button(text("⚙").size(18))
            .on_press(Message::OpenSettings)
            .style(button::text)
            .padding([4, 8]),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    let mut content = column![header].spacing(8).padding(10);
    if let Some(hint) = session.hint() {
        content = content.push(text(hint).size(13).color(Color::from_rgb8(169, 177, 214)));
    }

    let main_panel = content
        .push(emoji_grid(app))
        .push(category_strip(app));

    let mut layers: Vec<Element<'_, Message>> = vec![container(main_panel)
        .width(Fill)
        .height(Fill)
        .into()];

    if let Some(overlay) = &app.overlay {
        layers.push(dimmed(match overlay {
            Overlay::SkinTones(hexcode) => skin_tone_panel(app, hexcode),
            Overlay::TagEditor { hexcode, draft } => tag_editor_panel(app, hexcode, draft),
            Overlay::Shortcuts => shortcuts_panel(),
            Overlay::Settings { editing, locales } => {
                settings_panel(app, editing.as_ref(), locales)
            }
        }));
    }

    if let Some((toast, _)) = &app.toast {
        layers.push(
            container(
                container(text(toast.as_str()).size(14))
                    .padding([6, 12])
                    .style(container::bordered_box),
            )
            .width(Fill)
            .height(Fill)
            .align_x(Alignment::Center)
            .align_y(Alignment::End)
            .padding(56)
            .into(),
        );
    }

    stack(layers).into()
}

pub(crate) fn theme(_app: &App) -> Theme {
    Theme::TokyoNight
}

pub(crate) fn subscription(_app: &App) -> Subscription<Message> {
    Subscription::batch(vec![
        iced::time::every(POLL_INTERVAL).map(|_| Message::PollExternal),
        iced::event::listen_with(keymap::route_event),
    ])
}

fn emoji_grid(app: &App) -> Element<'_, Message> {
    let session = app.picker.session();
    let visible = app.picker.visible();

    if visible.is_empty() {
        let message = if session.query().is_some() {
            "No emoji found"
        } else {
            ""
        };
        return container(text(message).size(14))
            .width(Fill)
            .height(Fill)
            .center_x(Fill)
            .center_y(Fill)
            .into();
    }

    let size = emoji_font_size(app.picker.settings().emoji_size_class);
    let focused = match session.focus {
        Focus::Emoji(position) => Some(position),
        _ => None,
    };

    let mut grid = column![].spacing(2);
    for (row_index, chunk) in visible.chunks(app.picker.columns()).enumerate() {
        let mut cells = row![].spacing(2);
        for (offset, catalog_index) in chunk.iter().enumerate() {
            let position = row_index * app.picker.columns() + offset;
            let Some(record) = app.picker.catalog().get(*catalog_index) else {
                continue;
            };

            let is_focused = focused == Some(position);
            let is_selected = session.is_selected(&record.hexcode);
            cells = cells.push(
                button(
                    text(app.picker.display_glyph(record))
                        .size(size)
                        .align_x(Horizontal::Center),
                )
                .on_press(Message::EmojiPressed(position))
                .width(Length::FillPortion(1))
                .padding(4)
                .style(move |theme, status| emoji_button_style(theme, status, is_focused, is_selected)),
            );
        }
        grid = grid.push(cells);
    }

    scrollable(grid)
        .id(app.grid_scroll_id.clone())
        .height(Fill)
        .into()
}

fn category_strip(app: &App) -> Element<'_, Message> {
    let session = app.picker.session();
    let focused = match session.focus {
        Focus::Category(index) => Some(index),
        _ => None,
    };

    let mut strip = row![].spacing(2);
    for (index, category) in Category::STRIP.iter().enumerate() {
        let is_active = session.category_index() == index && session.query().is_none();
        let is_focused = focused == Some(index);
        strip = strip.push(
            button(text(category.icon().unwrap_or("?")).size(18).align_x(Horizontal::Center))
                .on_press(Message::CategoryPressed(index))
                .width(Length::FillPortion(1))
                .padding([4, 0])
                .style(move |theme, status| emoji_button_style(theme, status, is_focused, is_active)),
        );
    }

    container(strip).width(Fill).into()
}

fn skin_tone_panel<'a>(app: &'a App, hexcode: &str) -> Element<'a, Message> {
    let Some(record) = app.picker.catalog().by_hexcode(hexcode) else {
        return text("Unknown emoji").into();
    };

    let mut tones = row![].spacing(4);
    for (variant, tone) in record.skintones.iter().enumerate() {
        tones = tones.push(
            button(text(tone.emoji.as_str()).size(28))
                .on_press(Message::VariantChosen {
                    hexcode: record.hexcode.clone(),
                    variant,
                })
                .style(button::text),
        );
    }

    column![
        text("Skin tones").size(18),
        tones,
        close_button("Close"),
    ]
    .spacing(10)
    .into()
}

fn tag_editor_panel<'a>(app: &'a App, hexcode: &str, draft: &str) -> Element<'a, Message> {
    let glyph = app
        .picker
        .catalog()
        .by_hexcode(hexcode)
        .map(|record| app.picker.display_glyph(record))
        .unwrap_or_default();
    let existing = app
        .picker
        .custom_tags()
        .get(hexcode)
        .map(|entry| entry.tags.as_str())
        .unwrap_or_default();

    let mut panel = column![
        text(format!("Custom tags for {}", glyph)).size(18),
        text_input("Comma separated tags", draft)
            .id(app.tag_input_id.clone())
            .on_input(Message::TagDraftChanged)
            .on_submit(Message::TagDraftSubmitted)
            .padding(6),
    ]
    .spacing(10);

    if !existing.is_empty() {
        panel = panel.push(text(format!("Saved: {}", existing)).size(13));
    }

    panel
        .push(
            row![
                close_button("Cancel"),
                button(text("Add"))
                    .on_press(Message::TagDraftSubmitted)
                    .style(button::primary),
            ]
            .spacing(8),
        )
        .into()
}

fn shortcuts_panel<'a>() -> Element<'a, Message> {
    let mut list = column![text("Keyboard shortcuts").size(18)].spacing(6);
    for (keys, description) in SHORTCUTS {
        list = list.push(
            row![
                text(keys).size(13).width(Length::Fixed(150.0)),
                text(description).size(13),
            ]
            .spacing(8),
        );
    }

    list.push(close_button("Close")).into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SkinToneChoice {
    modifier: &'static str,
    preview: &'static str,
}

impl fmt::Display for SkinToneChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.preview)
    }
}

fn settings_panel<'a>(
    app: &'a App,
    editing: Option<&'a TagEdit>,
    locales: &'a [String],
) -> Element<'a, Message> {
    let settings = app.picker.settings();

    let tones: Vec<SkinToneChoice> = SKINTONE_MODIFIERS
        .iter()
        .map(|&(modifier, preview)| SkinToneChoice { modifier, preview })
        .collect();
    let current_tone = tones
        .iter()
        .copied()
        .find(|choice| choice.modifier == settings.skintone_modifier);

    let general = column![
        text("Settings").size(18),
        toggler(settings.iconify_on_esc)
            .label("Minimize instead of hiding on Esc")
            .on_toggle(|v| Message::SettingChanged(SettingValue::IconifyOnEsc(v))),
        toggler(settings.load_hidden_on_startup)
            .label("Start hidden on login")
            .on_toggle(|v| Message::SettingChanged(SettingValue::LoadHiddenOnStartup(v))),
        toggler(settings.open_on_mouse_position)
            .label("Let the window manager place the window")
            .on_toggle(|v| Message::SettingChanged(SettingValue::OpenOnMousePosition(v))),
        toggler(settings.use_localized_tags)
            .label("Search with localized tags")
            .on_toggle(|v| Message::SettingChanged(SettingValue::UseLocalizedTags(v))),
        toggler(settings.merge_english_tags)
            .label("Also match English tags")
            .on_toggle(|v| Message::SettingChanged(SettingValue::MergeEnglishTags(v))),
        row![
            text("Tags language").width(Fill),
            pick_list(
                locales,
                Some(settings.tags_locale.clone()),
                |locale| Message::SettingChanged(SettingValue::TagsLocale(locale)),
            ),
        ]
        .align_y(Alignment::Center),
        row![
            text("Default skin tone").width(Fill),
            pick_list(tones, current_tone, |choice| {
                Message::SettingChanged(SettingValue::SkintoneModifier(choice.modifier.to_string()))
            }),
        ]
        .align_y(Alignment::Center),
        row![
            text("Emoji size").width(Fill),
            pick_list(EmojiSize::ALL, Some(settings.emoji_size_class), |size| {
                Message::SettingChanged(SettingValue::EmojiSizeClass(size))
            }),
        ]
        .align_y(Alignment::Center),
        row![
            text("Shortcut").width(Fill),
            text_input("ctrl+alt+Period", &app.hotkey_draft)
                .on_input(Message::HotkeyDraftChanged)
                .on_submit(Message::HotkeySubmitted)
                .width(Length::Fixed(180.0)),
        ]
        .align_y(Alignment::Center),
    ]
    .spacing(10);

    let mut tags = column![text("Custom tags").size(16)].spacing(6);
    let custom_tags = app.picker.custom_tags();
    if custom_tags.is_empty() {
        tags = tags.push(text("There are no custom tags yet: create one with Alt + T").size(13));
    }
    for (hexcode, entry) in custom_tags {
        let glyph = app
            .picker
            .catalog()
            .by_hexcode(hexcode)
            .map(|record| record.emoji.as_str())
            .unwrap_or(hexcode.as_str());

        let line: Element<'_, Message> = match editing {
            Some(edit) if edit.hexcode == *hexcode => row![
                text(glyph).size(20),
                text_input("Comma separated tags", &edit.draft)
                    .on_input(Message::CustomTagsDraftChanged)
                    .on_submit(Message::SaveCustomTags)
                    .width(Fill),
                button(text("Save")).on_press(Message::SaveCustomTags),
            ]
            .spacing(8)
            .align_y(Alignment::Center)
            .into(),
            _ => row![
                text(glyph).size(20),
                text(entry.tags.as_str()).size(13).width(Fill),
                button(text("Edit"))
                    .on_press(Message::EditCustomTags(hexcode.clone()))
                    .style(button::secondary),
                button(text("Remove"))
                    .on_press(Message::DeleteCustomTags(hexcode.clone()))
                    .style(button::danger),
            ]
            .spacing(8)
            .align_y(Alignment::Center)
            .into(),
        };
        tags = tags.push(line);
    }

    scrollable(column![general, tags, close_button("Done")].spacing(16))
        .height(Length::Fixed(380.0))
        .into()
}

fn close_button<'a>(label: &'a str) -> Element<'a, Message> {
    button(text(label))
        .on_press(Message::CloseOverlay)
        .style(button::secondary)
        .padding([4, 12])
        .into()
}

fn dimmed<'a>(panel: Element<'a, Message>) -> Element<'a, Message> {
    container(
        container(panel)
            .padding(14)
            .width(Length::Fixed(380.0))
            .style(container::bordered_box),
    )
    .width(Fill)
    .height(Fill)
    .center_x(Fill)
    .center_y(Fill)
    .style(|_theme| container::Style {
        background: Some(Color::from_rgba8(8, 10, 14, 0.65).into()),
        ..container::Style::default()
    })
    .into()
}

fn emoji_font_size(size: EmojiSize) -> f32 {
    match size {
        EmojiSize::Default => 24.0,
        EmojiSize::Big => 30.0,
        EmojiSize::Bigger => 38.0,
        EmojiSize::Giant => 48.0,
    }
}

fn emoji_button_style(
    theme: &Theme,
    status: button::Status,
    is_focused: bool,
    is_marked: bool,
) -> button::Style {
    let base = button::text(theme, status);
    if is_focused {
        button::Style {
            background: Some(Color::from_rgb8(58, 84, 122).into()),
            border: iced::Border {
                color: Color::from_rgb8(255, 213, 128),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..base
        }
    } else if is_marked {
        button::Style {
            background: Some(Color::from_rgb8(41, 46, 66).into()),
            border: iced::Border {
                radius: 4.0.into(),
                ..iced::Border::default()
            },
            ..base
        }
    } else {
        base
    }
}
