use crate::error::{AllpacError, Result};
use crate::state::types::PackageList;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const MAX_BACKUPS: usize = 3;

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".bak.{}", index));
    PathBuf::from(name)
}

/// Newest parseable backup, copied back over `path`
pub(super) fn restore_from_backup(path: &Path) -> Result<Option<PackageList>> {
    for i in 1..=MAX_BACKUPS {
        let backup = backup_path(path, i);
        if !backup.exists() {
            continue;
        }
        let content = fs::read_to_string(&backup).map_err(|e| AllpacError::IoError {
            path: backup.clone(),
            source: e,
        })?;

        let parsed = if content.trim().is_empty() {
            Ok(PackageList::new())
        } else {
            serde_json::from_str::<PackageList>(&content)
        };
        match parsed {
            Ok(list) => {
                fs::copy(&backup, path).map_err(|e| AllpacError::persistence(path, e))?;
                return Ok(Some(list));
            }
            Err(e) => {
                warn!(backup = %backup.display(), "skipping unreadable backup: {}", e);
                continue;
            }
        }
    }

    Ok(None)
}

/// Shift `pkg.list.bak.N` up by one and copy the current file to `.bak.1`
pub(super) fn rotate_backups(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    for i in (1..MAX_BACKUPS).rev() {
        let old_bak = backup_path(path, i);
        let new_bak = backup_path(path, i + 1);
        if old_bak.exists()
            && let Err(e) = fs::rename(&old_bak, &new_bak)
        {
            warn!(
                "failed to rotate backup {} -> {}: {}",
                old_bak.display(),
                new_bak.display(),
                e
            );
        }
    }

    let first_bak = backup_path(path, 1);
    fs::copy(path, &first_bak).map_err(|e| AllpacError::IoError {
        path: first_bak,
        source: e,
    })?;

    Ok(())
}
