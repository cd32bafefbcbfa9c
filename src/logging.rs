//! Diagnostic log.
//!
//! User-facing output goes through [`crate::ui`]; this sets up the
//! `tracing` sink behind it: an append-only file at
//! `~/.allpac/logs/allpac.log`, filtered by `ALLPAC_LOG` (default `info`).

use crate::error::{AllpacError, Result};
use crate::project_identity;
use crate::utils::paths;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "info";

/// Install the file subscriber at the default location.
/// Returns the log path on success.
pub fn init() -> Result<PathBuf> {
    let path = paths::log_file()?;
    init_at(&path)?;
    Ok(path)
}

pub fn init_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| AllpacError::IoError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AllpacError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

    let filter = EnvFilter::try_from_env(project_identity::env_key("LOG"))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| AllpacError::Other(format!("Failed to initialize logging: {}", e)))
}
