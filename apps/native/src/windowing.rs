use iced::widget::operation;
use iced::{widget, window, Size, Task};

use crate::{Message, WINDOW_HEIGHT, WINDOW_WIDTH};

pub(crate) fn native_window_settings(start_hidden: bool, at_pointer: bool) -> window::Settings {
    let mut settings = window::Settings::default();
    settings.size = Size::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    settings.min_size = Some(Size::new(WINDOW_WIDTH, 240.0));
    // Pointer placement is left to the window manager.
    settings.position = if at_pointer {
        window::Position::Default
    } else {
        window::Position::Centered
    };
    settings.resizable = false;
    settings.visible = !start_hidden;
    settings.level = window::Level::AlwaysOnTop;
    settings.exit_on_close_request = false;

    #[cfg(target_os = "linux")]
    {
        settings.platform_specific.application_id = smilecore_shell::BUS_NAME.to_string();
    }

    settings
}

pub(crate) fn show_window() -> Task<Message> {
    window::latest().then(move |maybe_id| {
        if let Some(id) = maybe_id {
            Task::batch(vec![
                window::set_mode(id, window::Mode::Windowed),
                window::minimize(id, false),
                window::gain_focus(id),
            ])
        } else {
            Task::none()
        }
    })
}

pub(crate) fn hide_window(iconify: bool) -> Task<Message> {
    window::latest().then(move |maybe_id| {
        if let Some(id) = maybe_id {
            if iconify {
                window::minimize(id, true)
            } else {
                window::set_mode(id, window::Mode::Hidden)
            }
        } else {
            Task::none()
        }
    })
}

pub(crate) fn keep_search_input_focus(search_input_id: widget::Id) -> Task<Message> {
    Task::batch(vec![
        operation::focus(search_input_id.clone()),
        operation::move_cursor_to_end(search_input_id),
    ])
}

/// Drops text focus from every input. `anchor` must not name a focusable
/// widget.
pub(crate) fn release_input_focus(anchor: widget::Id) -> Task<Message> {
    operation::focus(anchor)
}

pub(crate) fn focus_input(input_id: widget::Id) -> Task<Message> {
    operation::focus(input_id)
}

pub(crate) fn sync_grid_scroll(scroll_id: widget::Id, row: usize, rows: usize) -> Task<Message> {
    if rows <= 1 {
        return Task::none();
    }

    let y = (row as f32 / (rows - 1) as f32).clamp(0.0, 1.0);
    operation::snap_to(scroll_id, widget::scrollable::RelativeOffset { x: 0.0, y })
}
