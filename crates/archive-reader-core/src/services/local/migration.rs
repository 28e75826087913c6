use super::{LocalLibrary, read_toml, write_toml};
use crate::services::{MigrationSummary, Migrator};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct MigrationStamp {
    #[serde(default)]
    schema_version: u32,
}

/// Brings data written by older builds up to the current schema.
#[derive(Debug)]
pub struct LocalMigrator {
    library: Arc<LocalLibrary>,
    stamp_path: PathBuf,
}

impl LocalMigrator {
    pub fn new(library: Arc<LocalLibrary>, stamp_path: PathBuf) -> Self {
        Self {
            library,
            stamp_path,
        }
    }
}

impl Migrator for LocalMigrator {
    fn migrate_all(&self) -> Result<MigrationSummary> {
        let stamp: MigrationStamp = read_toml(&self.stamp_path)?;
        let from_version = stamp.schema_version;
        if from_version >= CURRENT_SCHEMA_VERSION {
            return Ok(MigrationSummary {
                from_version,
                to_version: from_version,
                migrated_entries: 0,
            });
        }

        // Schema 0 stored archive paths relative to the working directory.
        let migrated_entries = self.library.absolutize_paths()?;

        write_toml(
            &self.stamp_path,
            &MigrationStamp {
                schema_version: CURRENT_SCHEMA_VERSION,
            },
        )?;
        info!(
            from_version,
            to_version = CURRENT_SCHEMA_VERSION,
            migrated_entries,
            "Migrated stored data"
        );
        Ok(MigrationSummary {
            from_version,
            to_version: CURRENT_SCHEMA_VERSION,
            migrated_entries,
        })
    }
}
