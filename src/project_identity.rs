//! Central project identity contract.
//!
//! This module is the single source of truth for runtime identity values.

pub const BINARY_NAME: &str = "allpac";
pub const HOME_DIR_NAME: &str = ".allpac";
pub const ENV_PREFIX: &str = "ALLPAC";
pub const USER_AGENT: &str = concat!("allpac/", env!("CARGO_PKG_VERSION"));

pub const PACKAGE_LIST_FILE_NAME: &str = "pkg.list";
pub const CONFIG_FILE_NAME: &str = "config.kdl";
pub const LOCK_FILE_NAME: &str = "allpac.lock";
pub const LOG_FILE_NAME: &str = "allpac.log";
pub const CACHE_DIR_NAME: &str = "cache";
pub const LOG_DIR_NAME: &str = "logs";

pub fn env_key(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

pub fn cli_with(args: &str) -> String {
    format!("{} {}", BINARY_NAME, args)
}
