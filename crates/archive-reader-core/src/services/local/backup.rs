use crate::services::BackupSetting;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Marker honoured by common backup tools (e.g. `--exclude-if-present`).
pub const NO_BACKUP_MARKER: &str = ".nobackup";

/// Includes or excludes the library directory from backups.
#[derive(Debug, Clone)]
pub struct LocalBackup {
    library_dir: PathBuf,
}

impl LocalBackup {
    pub fn new(library_dir: PathBuf) -> Self {
        Self { library_dir }
    }

    fn marker_path(&self) -> PathBuf {
        self.library_dir.join(NO_BACKUP_MARKER)
    }
}

impl BackupSetting for LocalBackup {
    fn apply_file_backup_setting(&self, is_enabled: bool) -> Result<()> {
        let marker = self.marker_path();
        if is_enabled {
            if marker.exists() {
                fs::remove_file(&marker)
                    .with_context(|| format!("failed to remove {}", marker.display()))?;
            }
        } else {
            fs::create_dir_all(&self.library_dir)
                .with_context(|| format!("failed to create {}", self.library_dir.display()))?;
            fs::write(&marker, b"")
                .with_context(|| format!("failed to write {}", marker.display()))?;
        }
        info!(is_enabled, dir = %self.library_dir.display(), "Applied file backup setting");
        Ok(())
    }
}
