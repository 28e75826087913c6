pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_library_dir() -> String {
    "library".to_string()
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_backup_documents() -> bool {
    false
}

pub(crate) fn default_library_auto_refresh() -> bool {
    true
}

pub(crate) fn default_restore_windows() -> bool {
    true
}

pub(crate) fn default_page_zoom() -> f32 {
    1.0
}

pub(crate) fn default_window_width() -> f32 {
    1024.0
}

pub(crate) fn default_window_height() -> f32 {
    768.0
}

pub(crate) fn default_key_new_window() -> String {
    "ctrl+n".to_string()
}

pub(crate) fn default_key_close_window() -> String {
    "ctrl+w".to_string()
}

pub(crate) fn default_key_quit() -> String {
    "ctrl+q".to_string()
}

pub(crate) fn default_key_refresh_library() -> String {
    "ctrl+r".to_string()
}

pub(crate) fn default_key_settings() -> String {
    "ctrl+,".to_string()
}

pub(crate) fn default_key_reading() -> String {
    "ctrl+1".to_string()
}

pub(crate) fn default_key_bookmarks() -> String {
    "ctrl+2".to_string()
}

pub(crate) fn default_key_opened() -> String {
    "ctrl+3".to_string()
}

pub(crate) fn default_key_categories() -> String {
    "ctrl+4".to_string()
}

pub(crate) fn default_key_downloads() -> String {
    "ctrl+5".to_string()
}

pub(crate) fn default_key_new() -> String {
    "ctrl+6".to_string()
}
