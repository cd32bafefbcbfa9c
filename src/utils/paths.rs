use crate::error::{AllpacError, Result};
use crate::project_identity;
use directories::UserDirs;
use std::path::PathBuf;

/// Base directory for everything allpac keeps on disk.
///
/// `~/.allpac` unless `ALLPAC_HOME` is set.
pub fn base_dir() -> Result<PathBuf> {
    if let Ok(custom) = std::env::var(project_identity::env_key("HOME"))
        && !custom.trim().is_empty()
    {
        return Ok(PathBuf::from(custom));
    }

    let user_dirs = UserDirs::new()
        .ok_or_else(|| AllpacError::PathError("Could not determine user home directory".into()))?;
    Ok(user_dirs.home_dir().join(project_identity::HOME_DIR_NAME))
}

pub fn package_list_file() -> Result<PathBuf> {
    Ok(base_dir()?.join(project_identity::PACKAGE_LIST_FILE_NAME))
}

pub fn config_file() -> Result<PathBuf> {
    Ok(base_dir()?.join(project_identity::CONFIG_FILE_NAME))
}

pub fn lock_file() -> Result<PathBuf> {
    Ok(base_dir()?.join(project_identity::LOCK_FILE_NAME))
}

/// AUR clone/build cache
pub fn cache_dir() -> Result<PathBuf> {
    Ok(base_dir()?.join(project_identity::CACHE_DIR_NAME))
}

pub fn log_file() -> Result<PathBuf> {
    Ok(base_dir()?
        .join(project_identity::LOG_DIR_NAME)
        .join(project_identity::LOG_FILE_NAME))
}
