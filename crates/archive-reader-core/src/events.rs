use crate::config::SettingsPatch;
use crate::lifecycle::{LaunchReport, StepOutcome};
use crate::navigation::NavigationItem;
use crate::services::LibraryState;
use crate::window::WindowId;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use url::Url;

/// A request to show a URL, coming from the command line, a dropped file,
/// or the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub url: Url,
    pub is_file: bool,
}

impl OpenRequest {
    pub fn file(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path)?;
        let url = Url::from_file_path(&absolute)
            .map_err(|_| anyhow!("cannot express {} as a URL", absolute.display()))?;
        Ok(Self { url, is_file: true })
    }

    pub fn url(url: Url) -> Self {
        let is_file = url.scheme() == "file";
        Self { url, is_file }
    }

    /// Existing paths become file URLs; anything else must parse as a URL.
    pub fn from_argument(raw: &str) -> Result<Self> {
        let path = Path::new(raw);
        if path.exists() {
            return Self::file(path);
        }
        Url::parse(raw)
            .map(Self::url)
            .map_err(|err| anyhow!("{raw:?} is neither an existing file nor a URL: {err}"))
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        if !self.is_file {
            return None;
        }
        self.url.to_file_path().ok()
    }
}

/// Everything that can happen to the shell, in the order it happened.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// A window gained host-level identity.
    WindowOpened(WindowId),
    WindowFocused(WindowId),
    WindowClosed(WindowId),
    TerminateRequested,
    UrlOpened(OpenRequest),
    NavigationSelected {
        window: WindowId,
        item: NavigationItem,
    },
    NewWindowRequested,
    CloseWindowRequested(WindowId),
    CatalogReopened(StepOutcome),
    LaunchSettled(LaunchReport),
    ArchiveResolved {
        window: WindowId,
        path: PathBuf,
        url: Option<Url>,
        error: Option<String>,
    },
    SettingsChanged(SettingsPatch),
    BackupSettingApplied {
        error: Option<String>,
    },
    LibraryRefreshRequested,
    LibraryRefreshed {
        state: LibraryState,
        error: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_path_becomes_file_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("wiki.zim");
        std::fs::write(&archive, b"ZIM").expect("write archive");

        let request =
            OpenRequest::from_argument(archive.to_str().expect("utf-8 path")).expect("request");

        assert!(request.is_file);
        assert_eq!(request.url.scheme(), "file");
        assert_eq!(request.file_path(), Some(archive));
    }

    #[test]
    fn url_argument_is_not_a_file() {
        let request = OpenRequest::from_argument("zim://0123456789abcdef/A/Main_Page")
            .expect("request");
        assert!(!request.is_file);
        assert_eq!(request.file_path(), None);
    }

    #[test]
    fn garbage_argument_is_rejected() {
        assert!(OpenRequest::from_argument("definitely not a url").is_err());
    }
}
