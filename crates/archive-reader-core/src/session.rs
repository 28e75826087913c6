use crate::navigation::NavigationItem;
use crate::tabs::{TabId, TabRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<TabId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(default = "default_item")]
    pub item: NavigationItem,
}

/// Windows and tabs as they were when the session was last persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub windows: Vec<WindowSnapshot>,
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

fn default_item() -> NavigationItem {
    NavigationItem::Reading
}

/// Missing or unreadable sessions are treated as no session.
pub fn load_session(path: &Path) -> Option<SessionSnapshot> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), "No saved session: {err}");
            return None;
        }
    };
    match toml::from_str::<SessionSnapshot>(&contents) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(path = %path.display(), "Ignoring corrupt session file: {err}");
            None
        }
    }
}

pub fn save_session(path: &Path, snapshot: &SessionSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string(snapshot).context("failed to serialize session")?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), windows = snapshot.windows.len(), "Saved session");
    Ok(())
}
