use iced::keyboard::{self, key::Named};
use iced::{event, window, Event};
use smilecore_picker::{Key, KeyPress, Modifiers};

use crate::Message;

/// Forwards keyboard and close events to `update`, including key presses a
/// focused text input already consumed.
pub(crate) fn route_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            Some(Message::KeyPressed(key_press(&key, modifiers)))
        }
        Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
            Some(Message::ModifiersChanged(picker_modifiers(modifiers)))
        }
        Event::Window(window::Event::CloseRequested) => Some(Message::CloseRequested),
        _ => None,
    }
}

pub(crate) fn picker_modifiers(modifiers: keyboard::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift(),
        ctrl: modifiers.control(),
        alt: modifiers.alt(),
    }
}

pub(crate) fn key_press(key: &keyboard::Key, modifiers: keyboard::Modifiers) -> KeyPress {
    let key = match key.as_ref() {
        keyboard::Key::Named(Named::Escape) => Key::Escape,
        keyboard::Key::Named(Named::Enter) => Key::Enter,
        keyboard::Key::Named(Named::Backspace) => Key::Backspace,
        keyboard::Key::Named(Named::ArrowUp) => Key::Up,
        keyboard::Key::Named(Named::ArrowDown) => Key::Down,
        keyboard::Key::Named(Named::ArrowLeft) => Key::Left,
        keyboard::Key::Named(Named::ArrowRight) => Key::Right,
        keyboard::Key::Named(Named::Space) => Key::Char(' '),
        keyboard::Key::Character(text) => single_char(text).map_or(Key::Other, Key::Char),
        _ => Key::Other,
    };

    KeyPress::new(key, picker_modifiers(modifiers))
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}
