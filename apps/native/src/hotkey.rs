use anyhow::{anyhow, Result};
use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tracing::info;

/// System-wide shortcut that toggles the picker.
pub(crate) struct GlobalShortcut {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl GlobalShortcut {
    pub(crate) fn register(accelerator: &str) -> Result<Self> {
        let hotkey = parse_accelerator(accelerator)?;
        let manager = GlobalHotKeyManager::new()?;
        manager.register(hotkey)?;

        info!(accelerator, "global shortcut registered");
        Ok(Self { manager, hotkey })
    }

    pub(crate) fn rebind(&mut self, accelerator: &str) -> Result<()> {
        let hotkey = parse_accelerator(accelerator)?;
        if hotkey == self.hotkey {
            return Ok(());
        }

        self.manager.unregister(self.hotkey)?;
        if let Err(err) = self.manager.register(hotkey) {
            self.manager.register(self.hotkey)?;
            return Err(err.into());
        }

        self.hotkey = hotkey;
        info!(accelerator, "global shortcut changed");
        Ok(())
    }

    /// Drains pending hotkey events; true when ours was pressed.
    pub(crate) fn pressed(&self) -> bool {
        let mut pressed = false;
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if event.id == self.hotkey.id() && event.state == HotKeyState::Pressed {
                pressed = true;
            }
        }
        pressed
    }
}

pub(crate) fn parse_accelerator(accelerator: &str) -> Result<HotKey> {
    accelerator
        .parse::<HotKey>()
        .map_err(|err| anyhow!("invalid shortcut {accelerator:?}: {err}"))
}

#[cfg(test)]
mod tests {
    use global_hotkey::hotkey::{Code, Modifiers};

    use super::*;

    #[test]
    fn default_accelerator_parses() {
        let hotkey = parse_accelerator("ctrl+alt+Period").unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::Period)
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_accelerator("ctrl+alt+").is_err());
        assert!(parse_accelerator("ctrl+definitely-not-a-key").is_err());
    }
}
