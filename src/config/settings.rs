//! Settings Module
//!
//! Timeouts, build parallelism and backend endpoints, read from the
//! `settings { ... }` block of `~/.allpac/config.kdl`.

use crate::error::{AllpacError, Result};
use kdl::{KdlDocument, KdlNode};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_BUILD_JOBS: usize = 4;
pub const DEFAULT_FLATPAK_REMOTE: &str = "flathub";
pub const DEFAULT_AUR_URL: &str = "https://aur.archlinux.org";

const VALID_KEYS: [&str; 5] = [
    "command-timeout",
    "search-timeout",
    "build-jobs",
    "flatpak-remote",
    "aur-url",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Install, update, uninstall and AUR builds
    pub command_timeout: Duration,
    /// Searches and version lookups
    pub search_timeout: Duration,
    /// Upper bound on concurrent AUR builds
    pub build_jobs: usize,
    pub flatpak_remote: String,
    pub aur_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            search_timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            build_jobs: DEFAULT_BUILD_JOBS,
            flatpak_remote: DEFAULT_FLATPAK_REMOTE.to_string(),
            aur_url: DEFAULT_AUR_URL.to_string(),
        }
    }
}

impl Settings {
    /// Load from `path`; defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| AllpacError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let doc: KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
            AllpacError::ConfigError(format!("KDL parsing error: {}", e))
        })?;

        let mut settings = Self::default();
        for node in doc.nodes() {
            match node.name().value() {
                "settings" => {
                    if let Some(children) = node.children() {
                        for child in children.nodes() {
                            settings.apply(child)?;
                        }
                    }
                }
                other => {
                    return Err(AllpacError::ConfigError(format!(
                        "Unknown top-level node '{}' (expected 'settings')",
                        other
                    )));
                }
            }
        }
        Ok(settings)
    }

    /// Command line `--timeout` wins over the file
    pub fn with_command_timeout(mut self, secs: Option<u64>) -> Result<Self> {
        if let Some(secs) = secs {
            if secs == 0 {
                return Err(AllpacError::ConfigError(
                    "--timeout must be at least 1 second".into(),
                ));
            }
            self.command_timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }

    fn apply(&mut self, node: &KdlNode) -> Result<()> {
        let key = node.name().value();
        match key {
            "command-timeout" => self.command_timeout = Duration::from_secs(positive(node)?),
            "search-timeout" => self.search_timeout = Duration::from_secs(positive(node)?),
            "build-jobs" => self.build_jobs = positive(node)? as usize,
            "flatpak-remote" => self.flatpak_remote = non_empty_string(node)?,
            "aur-url" => {
                let url = non_empty_string(node)?;
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(AllpacError::ConfigError(format!(
                        "Invalid value for 'aur-url': '{}' is not an http(s) URL",
                        url
                    )));
                }
                self.aur_url = url.trim_end_matches('/').to_string();
            }
            _ => {
                return Err(AllpacError::ConfigError(format!(
                    "Unknown setting: '{}'. Valid settings: {}",
                    key,
                    VALID_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn positive(node: &KdlNode) -> Result<u64> {
    let key = node.name().value();
    let value = single_value(node)?
        .as_integer()
        .ok_or_else(|| invalid(key, "expected an integer"))?;
    if value < 1 {
        return Err(invalid(key, "must be at least 1"));
    }
    u64::try_from(value).map_err(|_| invalid(key, "value too large"))
}

fn non_empty_string(node: &KdlNode) -> Result<String> {
    let key = node.name().value();
    let value = single_value(node)?
        .as_string()
        .ok_or_else(|| invalid(key, "expected a string"))?
        .trim();
    if value.is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    Ok(value.to_string())
}

fn single_value(node: &KdlNode) -> Result<&kdl::KdlValue> {
    let key = node.name().value();
    match node.entries() {
        [entry] if entry.name().is_none() => Ok(entry.value()),
        _ => Err(invalid(key, "expected exactly one value")),
    }
}

fn invalid(key: &str, reason: &str) -> AllpacError {
    AllpacError::ConfigError(format!("Invalid value for '{}': {}", key, reason))
}
