use super::{is_archive_path, read_toml, write_toml};
use crate::services::{CatalogService, FileId, LibraryState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: FileId,
    pub path: PathBuf,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub opened: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    archives: Vec<CatalogEntry>,
}

/// Archive catalog persisted as TOML, plus the refresh state machine.
#[derive(Debug)]
pub struct LocalLibrary {
    library_dir: PathBuf,
    catalog_path: PathBuf,
    entries: Mutex<BTreeMap<FileId, CatalogEntry>>,
    /// Set once the catalog file has been merged into `entries`; nothing is
    /// saved before that.
    loaded: AtomicBool,
    state: Mutex<LibraryState>,
}

impl LocalLibrary {
    pub fn new(library_dir: PathBuf, catalog_path: PathBuf) -> Self {
        Self {
            library_dir,
            catalog_path,
            entries: Mutex::new(BTreeMap::new()),
            loaded: AtomicBool::new(false),
            state: Mutex::new(LibraryState::Idle),
        }
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    pub fn archives(&self) -> Vec<CatalogEntry> {
        self.lock_entries().values().cloned().collect()
    }

    pub fn is_opened(&self, id: &FileId) -> bool {
        self.lock_entries()
            .get(id)
            .is_some_and(|entry| entry.opened && entry.path.exists())
    }

    /// Rewrites relative catalog paths as absolute ones, re-keying their
    /// ids. Returns how many entries changed.
    pub fn absolutize_paths(&self) -> Result<usize> {
        let mut entries = self.lock_entries();
        self.ensure_loaded(&mut entries)?;
        let relative: Vec<FileId> = entries
            .values()
            .filter(|entry| entry.path.is_relative())
            .map(|entry| entry.id.clone())
            .collect();
        for id in &relative {
            let Some(mut entry) = entries.remove(id) else {
                continue;
            };
            entry.path = std::path::absolute(&entry.path)
                .with_context(|| format!("failed to resolve {}", entry.path.display()))?;
            entry.id = FileId::for_path(&entry.path);
            entries.insert(entry.id.clone(), entry);
        }
        if !relative.is_empty() {
            self.save(&entries)?;
        }
        Ok(relative.len())
    }

    /// Merges the catalog file into memory. Entries registered since
    /// startup win over their on-disk copies.
    pub fn load(&self) -> Result<()> {
        let mut entries = self.lock_entries();
        self.merge_from_disk(&mut entries)
    }

    fn merge_from_disk(&self, entries: &mut BTreeMap<FileId, CatalogEntry>) -> Result<()> {
        let file: CatalogFile = read_toml(&self.catalog_path)?;
        for entry in file.archives {
            entries.entry(entry.id.clone()).or_insert(entry);
        }
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    fn ensure_loaded(&self, entries: &mut BTreeMap<FileId, CatalogEntry>) -> Result<()> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }
        debug!(path = %self.catalog_path.display(), "Loading catalog before first write");
        self.merge_from_disk(entries)
    }

    fn register(&self, path: &Path) -> Result<(FileId, bool)> {
        let path = std::path::absolute(path)
            .with_context(|| format!("failed to resolve {}", path.display()))?;
        let id = FileId::for_path(&path);
        let mut entries = self.lock_entries();
        self.ensure_loaded(&mut entries)?;
        let is_new = !entries.contains_key(&id);
        let entry = entries.entry(id.clone()).or_insert_with(|| CatalogEntry {
            id: id.clone(),
            title: archive_title(&path),
            path: path.clone(),
            opened: false,
        });
        entry.opened = true;
        self.save(&entries)?;
        Ok((id, is_new))
    }

    fn scan(&self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Library directory missing; nothing to scan");
            return Ok(0);
        }
        let mut added = 0;
        for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?
        {
            let path = entry?.path();
            if !path.is_file() || !is_archive_path(&path) {
                continue;
            }
            let (id, is_new) = self.register(&path)?;
            if is_new {
                info!(%id, path = %path.display(), "Opened newly added archive");
                added += 1;
            }
        }
        Ok(added)
    }

    fn save(&self, entries: &BTreeMap<FileId, CatalogEntry>) -> Result<()> {
        let file = CatalogFile {
            archives: entries.values().cloned().collect(),
        };
        write_toml(&self.catalog_path, &file)
    }

    fn set_state(&self, state: LibraryState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn lock_entries(&self) -> MutexGuard<'_, BTreeMap<FileId, CatalogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogService for LocalLibrary {
    async fn reopen(&self) -> Result<()> {
        self.load()?;
        let mut entries = self.lock_entries();
        let mut missing = 0;
        for entry in entries.values_mut() {
            if entry.opened && !entry.path.exists() {
                warn!(id = %entry.id, path = %entry.path.display(), "Archive file vanished; closing");
                entry.opened = false;
                missing += 1;
            }
        }
        let reopened = entries.values().filter(|entry| entry.opened).count();
        info!(reopened, missing, "Reopened archives from catalog");
        if missing > 0 {
            self.save(&entries)?;
        }
        Ok(())
    }

    async fn scan_directory(&self, dir: &Path) -> Result<usize> {
        self.scan(dir)
    }

    async fn open_file(&self, path: &Path) -> Result<Option<FileId>> {
        if !path.is_file() || !is_archive_path(path) {
            warn!(path = %path.display(), "Not an archive file");
            return Ok(None);
        }
        let (id, _) = self.register(path)?;
        Ok(Some(id))
    }

    fn state(&self) -> LibraryState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn start(&self, is_user_initiated: bool) -> Result<()> {
        let current = self.state();
        if current == LibraryState::InProgress
            || (!is_user_initiated && current == LibraryState::Complete)
        {
            debug!(%current, is_user_initiated, "Skipping library refresh");
            return Ok(());
        }
        self.set_state(LibraryState::InProgress);
        match self.scan(&self.library_dir) {
            Ok(added) => {
                info!(added, is_user_initiated, "Library refresh complete");
                self.set_state(LibraryState::Complete);
                Ok(())
            }
            Err(err) => {
                self.set_state(LibraryState::Error);
                Err(err.context("library refresh failed"))
            }
        }
    }
}

fn archive_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}
