//! Local JSON persistence for usage history, custom tags and localized tags.
//!
//! Every store rewrites its whole file on save. There is no locking between
//! processes; the last writer wins.

mod custom_tags;
mod history;
mod localized;

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

pub use custom_tags::{CustomTagEntry, CustomTagStore, CustomTags};
pub use history::{now_unix_secs, History, HistoryEntry, HistoryStore};
pub use localized::{LocaleTags, LocalizedTags};

pub const HISTORY_FILE: &str = "history.json";
pub const CUSTOM_TAGS_FILE: &str = "custom_tags.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

/// What a read of the backing file found.
enum Contents<T> {
    Missing,
    Parsed(T),
    Malformed(serde_json::Error),
    Unreadable(std::io::Error),
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load<T: DeserializeOwned>(&self) -> Contents<T> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Contents::Missing,
            Err(err) => return Contents::Unreadable(err),
        };

        match serde_json::from_str(&content) {
            Ok(value) => Contents::Parsed(value),
            Err(err) => Contents::Malformed(err),
        }
    }

    /// Missing and unreadable files both read as `T::default()`.
    pub fn read<T: DeserializeOwned + Default>(&self) -> T {
        match self.load() {
            Contents::Parsed(value) => value,
            Contents::Missing => T::default(),
            Contents::Malformed(err) => {
                warn!(path = %self.path.display(), %err, "treating malformed file as empty");
                T::default()
            }
            Contents::Unreadable(err) => {
                warn!(path = %self.path.display(), %err, "treating unreadable file as empty");
                T::default()
            }
        }
    }

    /// Read half of a read-modify-write. A malformed file is renamed to
    /// `<name>.bak` before the caller starts over from `T::default()`; an
    /// unreadable one aborts the update.
    pub fn read_for_update<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        match self.load() {
            Contents::Parsed(value) => Ok(value),
            Contents::Missing => Ok(T::default()),
            Contents::Malformed(err) => {
                let backup = self.backup_path();
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    %err,
                    "moving malformed file aside"
                );
                std::fs::rename(&self.path, &backup)
                    .map_err(|source| StoreError::Io { path: backup, source })?;
                Ok(T::default())
            }
            Contents::Unreadable(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    pub fn write<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;

        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
