use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use zbus::zvariant::Value;

const LEGACY_AUTOSTART: &str = "smile.autostart.desktop";
const AUTOSTART_COMMAND: [&str; 2] = ["smile", "--start-hidden"];

pub fn legacy_autostart_file(config_dir: &Path) -> PathBuf {
    config_dir.join("autostart").join(LEGACY_AUTOSTART)
}

/// Deletes the desktop entry older releases wrote themselves. Returns true
/// when a file was removed.
pub fn remove_legacy_autostart(config_dir: &Path) -> io::Result<bool> {
    match std::fs::remove_file(legacy_autostart_file(config_dir)) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Options for `org.freedesktop.portal.Background.RequestBackground`.
pub fn background_options(enabled: bool) -> HashMap<&'static str, Value<'static>> {
    HashMap::from([
        ("reason", Value::from("Smile autostart")),
        ("autostart", Value::from(enabled)),
        ("background", Value::from(enabled)),
        ("commandline", Value::new(AUTOSTART_COMMAND.to_vec())),
    ])
}
