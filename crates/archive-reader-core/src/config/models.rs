use serde::Deserialize;
use std::path::PathBuf;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_library_dir")]
    pub library_dir: String,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_backup_documents")]
    pub backup_documents: bool,
    #[serde(default = "crate::config::defaults::default_library_auto_refresh")]
    pub library_auto_refresh: bool,
    #[serde(default = "crate::config::defaults::default_restore_windows")]
    pub restore_windows: bool,
    #[serde(default)]
    pub external_link_policy: ExternalLinkPolicy,
    #[serde(default)]
    pub search_snippet_mode: SnippetMode,
    #[serde(default = "crate::config::defaults::default_page_zoom")]
    pub page_zoom: f32,
    #[serde(default = "crate::config::defaults::default_window_width")]
    pub window_width: f32,
    #[serde(default = "crate::config::defaults::default_window_height")]
    pub window_height: f32,
    #[serde(default = "crate::config::defaults::default_key_new_window")]
    pub key_new_window: String,
    #[serde(default = "crate::config::defaults::default_key_close_window")]
    pub key_close_window: String,
    #[serde(default = "crate::config::defaults::default_key_quit")]
    pub key_quit: String,
    #[serde(default = "crate::config::defaults::default_key_refresh_library")]
    pub key_refresh_library: String,
    #[serde(default = "crate::config::defaults::default_key_settings")]
    pub key_settings: String,
    #[serde(default = "crate::config::defaults::default_key_reading")]
    pub key_reading: String,
    #[serde(default = "crate::config::defaults::default_key_bookmarks")]
    pub key_bookmarks: String,
    #[serde(default = "crate::config::defaults::default_key_opened")]
    pub key_opened: String,
    #[serde(default = "crate::config::defaults::default_key_categories")]
    pub key_categories: String,
    #[serde(default = "crate::config::defaults::default_key_downloads")]
    pub key_downloads: String,
    #[serde(default = "crate::config::defaults::default_key_new")]
    pub key_new: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: crate::config::defaults::default_log_level(),
            library_dir: crate::config::defaults::default_library_dir(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            backup_documents: crate::config::defaults::default_backup_documents(),
            library_auto_refresh: crate::config::defaults::default_library_auto_refresh(),
            restore_windows: crate::config::defaults::default_restore_windows(),
            external_link_policy: ExternalLinkPolicy::default(),
            search_snippet_mode: SnippetMode::default(),
            page_zoom: crate::config::defaults::default_page_zoom(),
            window_width: crate::config::defaults::default_window_width(),
            window_height: crate::config::defaults::default_window_height(),
            key_new_window: crate::config::defaults::default_key_new_window(),
            key_close_window: crate::config::defaults::default_key_close_window(),
            key_quit: crate::config::defaults::default_key_quit(),
            key_refresh_library: crate::config::defaults::default_key_refresh_library(),
            key_settings: crate::config::defaults::default_key_settings(),
            key_reading: crate::config::defaults::default_key_reading(),
            key_bookmarks: crate::config::defaults::default_key_bookmarks(),
            key_opened: crate::config::defaults::default_key_opened(),
            key_categories: crate::config::defaults::default_key_categories(),
            key_downloads: crate::config::defaults::default_key_downloads(),
            key_new: crate::config::defaults::default_key_new(),
        }
    }
}

impl AppConfig {
    pub fn library_path(&self) -> PathBuf {
        PathBuf::from(&self.library_dir)
    }

    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.cache_dir)
    }

    pub fn session_path(&self) -> PathBuf {
        self.cache_path().join("session.toml")
    }
}

/// What to do when an article links outside the archive.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalLinkPolicy {
    #[default]
    Ask,
    Always,
    Never,
}

pub const EXTERNAL_LINK_POLICIES: [ExternalLinkPolicy; 3] = [
    ExternalLinkPolicy::Ask,
    ExternalLinkPolicy::Always,
    ExternalLinkPolicy::Never,
];

impl std::fmt::Display for ExternalLinkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExternalLinkPolicy::Ask => "Always ask",
            ExternalLinkPolicy::Always => "Always load",
            ExternalLinkPolicy::Never => "Never load",
        };
        write!(f, "{}", label)
    }
}

/// How much of an article to show under each search result.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SnippetMode {
    Disabled,
    FirstParagraph,
    FirstSentence,
    #[default]
    Matches,
}

pub const SNIPPET_MODES: [SnippetMode; 4] = [
    SnippetMode::Disabled,
    SnippetMode::FirstParagraph,
    SnippetMode::FirstSentence,
    SnippetMode::Matches,
];

impl std::fmt::Display for SnippetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SnippetMode::Disabled => "Disabled",
            SnippetMode::FirstParagraph => "First paragraph",
            SnippetMode::FirstSentence => "First sentence",
            SnippetMode::Matches => "Matches",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
