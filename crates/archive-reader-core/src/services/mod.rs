//! Contracts for the collaborators the shell drives but does not own.
//!
//! The desktop binary wires the filesystem-backed implementations in
//! [`local`]; tests substitute their own.

pub mod local;

use crate::config::AppConfig;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Stable identifier of an archive file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// First 16 hex digits of the SHA-256 of the path.
    pub fn for_path(path: &Path) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.as_os_str().to_string_lossy().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Progress of a library refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LibraryState {
    #[default]
    Idle,
    InProgress,
    Complete,
    Error,
}

impl std::fmt::Display for LibraryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LibraryState::Idle => "idle",
            LibraryState::InProgress => "refreshing",
            LibraryState::Complete => "up to date",
            LibraryState::Error => "refresh failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationSummary {
    pub from_version: u32,
    pub to_version: u32,
    pub migrated_entries: usize,
}

impl MigrationSummary {
    pub fn is_noop(&self) -> bool {
        self.from_version == self.to_version
    }
}

/// Catalog store plus the library refresh state machine.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Re-open archives that were open in the previous session.
    async fn reopen(&self) -> Result<()>;

    /// Open archive files dropped into `dir`. Returns how many were new.
    async fn scan_directory(&self, dir: &Path) -> Result<usize>;

    /// Open a single archive file; `None` when it is not an archive.
    async fn open_file(&self, path: &Path) -> Result<Option<FileId>>;

    fn state(&self) -> LibraryState;

    async fn start(&self, is_user_initiated: bool) -> Result<()>;
}

#[async_trait]
pub trait ArchiveService: Send + Sync {
    async fn main_page_url(&self, file: &FileId) -> Option<Url>;
}

pub trait DownloadService: Send + Sync {
    /// Idempotent.
    fn restart_heartbeat_if_needed(&self);
}

pub trait BackupSetting: Send + Sync {
    fn apply_file_backup_setting(&self, is_enabled: bool) -> Result<()>;
}

pub trait Migrator: Send + Sync {
    fn migrate_all(&self) -> Result<MigrationSummary>;
}

#[derive(Clone)]
pub struct ServiceSet {
    pub catalog: Arc<dyn CatalogService>,
    pub archives: Arc<dyn ArchiveService>,
    pub downloads: Arc<dyn DownloadService>,
    pub backup: Arc<dyn BackupSetting>,
    pub migrator: Arc<dyn Migrator>,
}

impl ServiceSet {
    /// Filesystem-backed collaborators rooted at the configured directories.
    pub fn local(config: &AppConfig) -> Self {
        let library = Arc::new(local::LocalLibrary::new(
            config.library_path(),
            config.cache_path().join(local::CATALOG_FILE),
        ));
        Self {
            catalog: library.clone(),
            archives: Arc::new(local::LocalArchives::new(library.clone())),
            downloads: Arc::new(local::LocalDownloads::new(
                config.cache_path().join(local::DOWNLOADS_FILE),
            )),
            backup: Arc::new(local::LocalBackup::new(config.library_path())),
            migrator: Arc::new(local::LocalMigrator::new(
                library,
                config.cache_path().join(local::MIGRATIONS_FILE),
            )),
        }
    }
}

impl std::fmt::Debug for ServiceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSet")
            .field("library_state", &self.catalog.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_is_stable_and_short() {
        let a = FileId::for_path(Path::new("/data/wikipedia_en.zim"));
        let b = FileId::for_path(Path::new("/data/wikipedia_en.zim"));
        let c = FileId::for_path(Path::new("/data/wiktionary_en.zim"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 16);
        assert!(a.as_str().chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn migration_summary_noop_detection() {
        let noop = MigrationSummary {
            from_version: 1,
            to_version: 1,
            migrated_entries: 0,
        };
        assert!(noop.is_noop());
        assert!(
            !MigrationSummary {
                from_version: 0,
                ..noop
            }
            .is_noop()
        );
    }
}
