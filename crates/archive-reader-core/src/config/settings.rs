use super::{AppConfig, ExternalLinkPolicy, SnippetMode};
use tracing::debug;

pub const MIN_PAGE_ZOOM: f32 = 0.5;
pub const MAX_PAGE_ZOOM: f32 = 2.0;

/// A change made from the settings panel. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub backup_documents: Option<bool>,
    pub library_auto_refresh: Option<bool>,
    pub restore_windows: Option<bool>,
    pub external_link_policy: Option<ExternalLinkPolicy>,
    pub search_snippet_mode: Option<SnippetMode>,
    pub page_zoom: Option<f32>,
}

/// What actually changed after applying a patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsDelta {
    pub changed: bool,
    pub backup_changed: bool,
}

impl AppConfig {
    pub fn apply_patch(&mut self, patch: SettingsPatch) -> SettingsDelta {
        let before = self.clone();

        if let Some(enabled) = patch.backup_documents {
            self.backup_documents = enabled;
        }
        if let Some(enabled) = patch.library_auto_refresh {
            self.library_auto_refresh = enabled;
        }
        if let Some(enabled) = patch.restore_windows {
            self.restore_windows = enabled;
        }
        if let Some(policy) = patch.external_link_policy {
            self.external_link_policy = policy;
        }
        if let Some(mode) = patch.search_snippet_mode {
            self.search_snippet_mode = mode;
        }
        if let Some(zoom) = patch.page_zoom.filter(|zoom| zoom.is_finite()) {
            // Two-decimal precision.
            let clamped = zoom.clamp(MIN_PAGE_ZOOM, MAX_PAGE_ZOOM);
            self.page_zoom = (clamped * 100.0).round() / 100.0;
        }

        let delta = SettingsDelta {
            changed: *self != before,
            backup_changed: self.backup_documents != before.backup_documents,
        };
        debug!(?delta, "Applied settings patch");
        delta
    }
}
