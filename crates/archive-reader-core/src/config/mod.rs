//! Configuration loading for the archive reader.
//!
//! User-tunable settings live in `conf/config.toml` unless `--config` points
//! elsewhere. Missing or invalid entries fall back to defaults so the shell
//! can still launch.

mod defaults;
mod io;
mod models;
mod settings;

pub use io::{load_config, parse_config, save_config, serialize_config};
pub use models::{
    AppConfig, EXTERNAL_LINK_POLICIES, ExternalLinkPolicy, LogLevel, SNIPPET_MODES, SnippetMode,
};
pub use settings::{MAX_PAGE_ZOOM, MIN_PAGE_ZOOM, SettingsDelta, SettingsPatch};
