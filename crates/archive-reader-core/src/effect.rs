use crate::config::AppConfig;
use crate::events::ShellEvent;
use crate::lifecycle::{
    AppLifecycleCoordinator, LaunchOptions, LaunchReport, LaunchStep, StepOutcome,
};
use crate::session::SessionSnapshot;
use crate::tabs::TabId;
use crate::window::WindowId;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Side effect requested by [`crate::shell::Shell::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Platform(PlatformRequest),
    Service(ServiceCall),
}

/// Work only the host can do.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformRequest {
    OpenWindow,
    CloseWindow(WindowId),
    LoadUrl {
        window: WindowId,
        tab: TabId,
        url: Url,
    },
    Alert {
        window: Option<WindowId>,
        message: String,
    },
    PersistSession(SessionSnapshot),
    SaveConfig(AppConfig),
    Exit,
}

/// Asynchronous collaborator work. Every call completes with exactly one
/// [`ShellEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    ReopenCatalog,
    SettleLaunch(LaunchOptions),
    ResolveArchive { window: WindowId, path: PathBuf },
    ApplyBackupSetting(bool),
    RefreshLibrary { user_initiated: bool },
}

impl From<PlatformRequest> for Effect {
    fn from(request: PlatformRequest) -> Self {
        Effect::Platform(request)
    }
}

impl From<ServiceCall> for Effect {
    fn from(call: ServiceCall) -> Self {
        Effect::Service(call)
    }
}

#[derive(Debug, Clone)]
pub struct ServiceRunner {
    coordinator: Arc<AppLifecycleCoordinator>,
}

impl ServiceRunner {
    pub fn new(coordinator: Arc<AppLifecycleCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<AppLifecycleCoordinator> {
        &self.coordinator
    }

    pub async fn perform(&self, call: ServiceCall) -> ShellEvent {
        debug!(?call, "Running service call");
        let services = self.coordinator.services();
        match call {
            ServiceCall::ReopenCatalog => {
                let outcome = self.coordinator.reopen_catalog().await.unwrap_or(StepOutcome {
                    step: LaunchStep::ReopenCatalog,
                    error: None,
                });
                ShellEvent::CatalogReopened(outcome)
            }
            ServiceCall::SettleLaunch(options) => {
                let report = self
                    .coordinator
                    .settle(&options)
                    .await
                    .unwrap_or_else(LaunchReport::default);
                ShellEvent::LaunchSettled(report)
            }
            ServiceCall::ResolveArchive { window, path } => {
                let (url, error) = match services.catalog.open_file(&path).await {
                    Ok(Some(file)) => match services.archives.main_page_url(&file).await {
                        Some(url) => (Some(url), None),
                        None => (None, Some(format!("{} has no main page", path.display()))),
                    },
                    Ok(None) => (None, Some(format!("{} is not an archive", path.display()))),
                    Err(err) => {
                        warn!(path = %path.display(), "Failed to open archive: {err:#}");
                        (None, Some(format!("{err:#}")))
                    }
                };
                ShellEvent::ArchiveResolved {
                    window,
                    path,
                    url,
                    error,
                }
            }
            ServiceCall::ApplyBackupSetting(enabled) => {
                let error = services
                    .backup
                    .apply_file_backup_setting(enabled)
                    .err()
                    .map(|err| format!("{err:#}"));
                ShellEvent::BackupSettingApplied { error }
            }
            ServiceCall::RefreshLibrary { user_initiated } => {
                let error = services
                    .catalog
                    .start(user_initiated)
                    .await
                    .err()
                    .map(|err| format!("{err:#}"));
                ShellEvent::LibraryRefreshed {
                    state: services.catalog.state(),
                    error,
                }
            }
        }
    }
}
