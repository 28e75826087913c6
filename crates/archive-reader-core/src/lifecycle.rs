//! Startup and shutdown sequencing.
//!
//! Launch runs in two phases so the shell can flip every window to
//! `Reading` as soon as the catalog is populated:
//!
//! 1. [`AppLifecycleCoordinator::reopen_catalog`]
//! 2. [`AppLifecycleCoordinator::settle`]: directory scan, backup setting,
//!    download heartbeat, one-time migration, automatic library refresh.
//!
//! Each step runs to completion before the next starts. A failing step is
//! recorded and the sequence carries on; nothing is retried.

use crate::config::AppConfig;
use crate::services::{MigrationSummary, ServiceSet};
use crate::termination::TerminationFlag;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStep {
    ReopenCatalog,
    ScanDirectory,
    ApplyBackupSetting,
    ResumeDownloads,
    Migrate,
    RefreshLibrary,
}

impl std::fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LaunchStep::ReopenCatalog => "reopen catalog",
            LaunchStep::ScanDirectory => "scan library directory",
            LaunchStep::ApplyBackupSetting => "apply backup setting",
            LaunchStep::ResumeDownloads => "resume downloads",
            LaunchStep::Migrate => "migrate data",
            LaunchStep::RefreshLibrary => "refresh library",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: LaunchStep,
    pub error: Option<String>,
}

impl StepOutcome {
    fn from_result<T>(step: LaunchStep, result: anyhow::Result<T>) -> Self {
        let error = match result {
            Ok(_) => None,
            Err(err) => {
                warn!(%step, "Launch step failed: {err:#}");
                Some(format!("{err:#}"))
            }
        };
        Self { step, error }
    }

    fn ok(step: LaunchStep) -> Self {
        Self { step, error: None }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub library_dir: PathBuf,
    pub backup_enabled: bool,
    /// Set when running under a test harness.
    pub skip_migration: bool,
    pub auto_refresh: bool,
}

impl LaunchOptions {
    pub fn from_config(config: &AppConfig, testing: bool) -> Self {
        Self {
            library_dir: config.library_path(),
            backup_enabled: config.backup_documents,
            skip_migration: testing,
            auto_refresh: config.library_auto_refresh,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchReport {
    pub steps: Vec<StepOutcome>,
    pub migration: Option<MigrationSummary>,
}

impl LaunchReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|outcome| !outcome.succeeded())
    }

    pub fn ran(&self, step: LaunchStep) -> bool {
        self.steps.iter().any(|outcome| outcome.step == step)
    }
}

pub struct AppLifecycleCoordinator {
    services: ServiceSet,
    termination: TerminationFlag,
    reopened: AtomicBool,
    settled: AtomicBool,
}

impl AppLifecycleCoordinator {
    pub fn new(services: ServiceSet, termination: TerminationFlag) -> Self {
        Self {
            services,
            termination,
            reopened: AtomicBool::new(false),
            settled: AtomicBool::new(false),
        }
    }

    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    /// Phase one. Later calls return `None` without touching the catalog.
    pub async fn reopen_catalog(&self) -> Option<StepOutcome> {
        if self
            .reopened
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        info!("Reopening catalog");
        let result = self.services.catalog.reopen().await;
        Some(StepOutcome::from_result(LaunchStep::ReopenCatalog, result))
    }

    /// Phase two. Later calls return `None`.
    pub async fn settle(&self, options: &LaunchOptions) -> Option<LaunchReport> {
        if self
            .settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let mut report = LaunchReport::default();

        let scanned = self
            .services
            .catalog
            .scan_directory(&options.library_dir)
            .await;
        if let Ok(added) = &scanned {
            info!(added, dir = %options.library_dir.display(), "Scanned library directory");
        }
        report
            .steps
            .push(StepOutcome::from_result(LaunchStep::ScanDirectory, scanned));

        report.steps.push(StepOutcome::from_result(
            LaunchStep::ApplyBackupSetting,
            self.services
                .backup
                .apply_file_backup_setting(options.backup_enabled),
        ));

        self.services.downloads.restart_heartbeat_if_needed();
        report.steps.push(StepOutcome::ok(LaunchStep::ResumeDownloads));

        if options.skip_migration {
            info!("Testing mode; skipping data migration");
        } else {
            let migrated = self.services.migrator.migrate_all();
            if let Ok(summary) = &migrated {
                report.migration = Some(*summary);
            }
            report
                .steps
                .push(StepOutcome::from_result(LaunchStep::Migrate, migrated));
        }

        if options.auto_refresh {
            report.steps.push(StepOutcome::from_result(
                LaunchStep::RefreshLibrary,
                self.services.catalog.start(false).await,
            ));
        }

        info!(
            steps = report.steps.len(),
            failures = report.failures().count(),
            "Launch settled"
        );
        Some(report)
    }

    /// Shutdown path. Returns `true` for the call that began termination.
    pub fn terminate(&self) -> bool {
        let first = self.termination.mark();
        if first {
            info!("Application terminating");
        }
        first
    }

    pub fn is_terminating(&self) -> bool {
        self.termination.is_terminating()
    }
}

impl std::fmt::Debug for AppLifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppLifecycleCoordinator")
            .field("reopened", &self.reopened.load(Ordering::Acquire))
            .field("settled", &self.settled.load(Ordering::Acquire))
            .field("terminating", &self.termination.is_terminating())
            .finish()
    }
}
