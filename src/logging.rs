//! Logging setup
//!
//! Output goes to `~/.redline/redline.log` so log lines never interleave
//! with the interactive prompt. `RUST_LOG` wins over the configured level.

use crate::config::{ConnectionOptions, Settings};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub fn log_file() -> Option<PathBuf> {
    ConnectionOptions::config_dir()
        .ok()
        .map(|dir| dir.join("redline.log"))
}

/// Install the global subscriber. Logging stays off when the log file
/// cannot be opened.
pub fn init(settings: &Settings) {
    let Some(path) = log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
