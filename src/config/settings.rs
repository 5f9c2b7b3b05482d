//! Client-wide settings that are not tied to a connection

use crate::config::ConnectionOptions;
use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs read from `~/.redline/config.toml`; absent keys take defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Statements kept in the history ring
    pub history_size: usize,

    /// Persist history to `~/.redline/history`
    pub save_history: bool,

    /// Filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_size: 100,
            save_history: true,
            log_level: "warn".to_string(),
        }
    }
}

/// Read `~/.redline/config.toml`, or defaults when it does not exist
pub fn load_settings() -> ConfigResult<Settings> {
    load_settings_from(&ConnectionOptions::config_dir()?.join("config.toml"))
}

fn load_settings_from(path: &Path) -> ConfigResult<Settings> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e.into()),
    }
}
