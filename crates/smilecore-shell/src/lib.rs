//! Desktop integration: clipboard, notifications, autostart and the
//! single-instance handshake, all over the session bus where one exists.

mod autostart;
mod instance;

use std::collections::HashMap;

use tracing::{debug, warn};
use zbus::blocking::Connection;
use zbus::zvariant::Value;

pub use autostart::{background_options, legacy_autostart_file, remove_legacy_autostart};
pub use instance::{claim_or_activate, Activations, Instance, BUS_NAME, OBJECT_PATH};

pub const APP_NAME: &str = "Smile";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ShellActions {
    fn copy_text(&mut self, text: &str) -> Result<(), ShellError>;
    fn notify(&mut self, title: &str, body: &str) -> Result<(), ShellError>;
    fn set_autostart(&mut self, enabled: bool) -> Result<(), ShellError>;
}

/// Shell backed by the system clipboard and the session bus. Both are
/// opened lazily so a headless session only fails the calls that need them.
#[derive(Default)]
pub struct DesktopShell {
    clipboard: Option<arboard::Clipboard>,
    bus: Option<Connection>,
}

impl DesktopShell {
    pub fn new() -> Self {
        Self::default()
    }

    fn bus(&mut self) -> Result<&Connection, ShellError> {
        if self.bus.is_none() {
            self.bus = Some(Connection::session()?);
        }
        self.bus
            .as_ref()
            .ok_or_else(|| ShellError::DBus(zbus::Error::Failure("no session bus".into())))
    }
}

impl ShellActions for DesktopShell {
    fn copy_text(&mut self, text: &str) -> Result<(), ShellError> {
        if self.clipboard.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|err| ShellError::Clipboard(err.to_string()))?;
            self.clipboard = Some(clipboard);
        }

        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|err| ShellError::Clipboard(err.to_string())),
            None => Err(ShellError::Clipboard("not initialised".to_string())),
        }
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), ShellError> {
        let hints: HashMap<&str, Value<'_>> = HashMap::new();
        let actions: Vec<&str> = Vec::new();

        let reply = self.bus()?.call_method(
            Some("org.freedesktop.Notifications"),
            "/org/freedesktop/Notifications",
            Some("org.freedesktop.Notifications"),
            "Notify",
            &(APP_NAME, 0u32, "", title, body, actions, hints, -1i32),
        )?;
        let id: u32 = reply.body().deserialize()?;
        debug!(id, title, "notification sent");
        Ok(())
    }

    fn set_autostart(&mut self, enabled: bool) -> Result<(), ShellError> {
        if let Some(config) = dirs::config_dir() {
            if let Err(err) = remove_legacy_autostart(&config) {
                warn!(%err, "failed to remove legacy autostart entry");
            }
        }

        let reply = self.bus()?.call_method(
            Some("org.freedesktop.portal.Desktop"),
            "/org/freedesktop/portal/desktop",
            Some("org.freedesktop.portal.Background"),
            "RequestBackground",
            &("", background_options(enabled)),
        )?;
        let handle: zbus::zvariant::OwnedObjectPath = reply.body().deserialize()?;
        debug!(enabled, handle = %handle.as_str(), "background permission requested");
        Ok(())
    }
}
