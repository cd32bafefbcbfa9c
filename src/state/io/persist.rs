use crate::error::{AllpacError, Result};
use crate::state::types::PackageList;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `list` next to `path` and rename it into place.
///
/// A concurrent reader sees either the old file or the new one, never a
/// truncated one; a failed write leaves the old file as it was.
pub(super) fn write_list_atomically(path: &Path, list: &PackageList) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        AllpacError::PathError(format!(
            "Invalid package list path (no parent directory): {}",
            path.display()
        ))
    })?;

    let mut content = serde_json::to_string_pretty(list)
        .map_err(|e| AllpacError::persistence(path, format!("serialization failed: {}", e)))?;
    content.push('\n');

    let _: PackageList = serde_json::from_str(&content)
        .map_err(|e| AllpacError::persistence(path, format!("invalid JSON generated: {}", e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pkg.list".to_string());
    let tmp_path = dir.join(format!(
        ".{}.tmp.{}.{}",
        file_name,
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let write_result = (|| -> std::io::Result<()> {
        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()
    })();
    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(AllpacError::persistence(&tmp_path, e));
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AllpacError::persistence(path, e));
    }

    if let Ok(dir_file) = fs::File::open(dir)
        && let Err(e) = dir_file.sync_all()
    {
        warn!("failed to sync package list directory: {}", e);
    }

    Ok(())
}
