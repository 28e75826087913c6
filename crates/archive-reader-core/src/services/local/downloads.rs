use super::read_toml;
use crate::services::DownloadService;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub url: String,
    pub file: PathBuf,
    #[serde(default)]
    pub bytes_written: u64,
    #[serde(default)]
    pub total_bytes: Option<u64>,
    #[serde(default)]
    pub finished: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DownloadLedger {
    #[serde(default)]
    downloads: Vec<DownloadRecord>,
}

/// Bookkeeping for downloads interrupted by a previous quit.
///
/// This build has no download transport. The heartbeat is a marker saying
/// that a transport should resume the ledger's unfinished entries. It stays
/// set for the rest of the process.
#[derive(Debug)]
pub struct LocalDownloads {
    ledger_path: PathBuf,
    heartbeat: AtomicBool,
}

impl LocalDownloads {
    pub fn new(ledger_path: PathBuf) -> Self {
        Self {
            ledger_path,
            heartbeat: AtomicBool::new(false),
        }
    }

    pub fn is_heartbeat_running(&self) -> bool {
        self.heartbeat.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> Vec<DownloadRecord> {
        match read_toml::<DownloadLedger>(&self.ledger_path) {
            Ok(ledger) => ledger
                .downloads
                .into_iter()
                .filter(|record| !record.finished)
                .collect(),
            Err(err) => {
                warn!("Ignoring unreadable download ledger: {err:#}");
                Vec::new()
            }
        }
    }
}

impl DownloadService for LocalDownloads {
    /// Marks the heartbeat as running when the ledger has unfinished
    /// entries. Spawns no task.
    fn restart_heartbeat_if_needed(&self) {
        let pending = self.pending();
        if pending.is_empty() {
            debug!("No interrupted downloads");
            return;
        }
        if self
            .heartbeat
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Download heartbeat already running");
            return;
        }
        info!(pending = pending.len(), "Resumed download heartbeat");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::local::write_toml;

    #[test]
    fn heartbeat_needs_unfinished_downloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloads = LocalDownloads::new(dir.path().join("downloads.toml"));

        downloads.restart_heartbeat_if_needed();
        assert!(!downloads.is_heartbeat_running());

        write_toml(
            &dir.path().join("downloads.toml"),
            &DownloadLedger {
                downloads: vec![
                    DownloadRecord {
                        url: "https://example.org/a.zim".to_string(),
                        file: PathBuf::from("a.zim"),
                        bytes_written: 10,
                        total_bytes: Some(100),
                        finished: false,
                    },
                    DownloadRecord {
                        url: "https://example.org/b.zim".to_string(),
                        file: PathBuf::from("b.zim"),
                        bytes_written: 100,
                        total_bytes: Some(100),
                        finished: true,
                    },
                ],
            },
        )
        .expect("write ledger");

        assert_eq!(downloads.pending().len(), 1);
        downloads.restart_heartbeat_if_needed();
        assert!(downloads.is_heartbeat_running());

        downloads.restart_heartbeat_if_needed();
        assert!(downloads.is_heartbeat_running());
    }
}
