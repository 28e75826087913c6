//! Filesystem-backed collaborators used by the desktop build.
//!
//! State is kept in small TOML files under the cache directory, the same
//! way window sessions are.

mod archives;
mod backup;
mod downloads;
mod library;
mod migration;

pub use archives::{ARCHIVE_URL_SCHEME, LocalArchives};
pub use backup::{LocalBackup, NO_BACKUP_MARKER};
pub use downloads::{DownloadRecord, LocalDownloads};
pub use library::{CatalogEntry, LocalLibrary};
pub use migration::{CURRENT_SCHEMA_VERSION, LocalMigrator};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const CATALOG_FILE: &str = "catalog.toml";
pub const DOWNLOADS_FILE: &str = "downloads.toml";
pub const MIGRATIONS_FILE: &str = "migrations.toml";

pub(crate) const ARCHIVE_EXTENSION: &str = "zim";

/// Missing files read as `T::default()`.
pub(crate) fn read_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

pub(crate) fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

pub(crate) fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}
