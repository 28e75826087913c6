use super::AppConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from `path`, falling back to defaults on any problem.
pub fn load_config(path: &Path) -> AppConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match parse_config(&contents) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded config");
                config
            }
            Err(err) => {
                warn!(path = %path.display(), "Invalid config; using defaults: {err:#}");
                AppConfig::default()
            }
        },
        Err(err) => {
            debug!(path = %path.display(), "No config file; using defaults: {err}");
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).context("failed to parse config TOML")
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string(config).context("failed to serialize config")
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = serialize_config(config)?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "Saved config");
    Ok(())
}
