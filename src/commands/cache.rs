//! AUR build cache maintenance
//!
//! Every AUR build clones into `cache/<name>/<timestamp>`; nothing is
//! reused between builds, so the whole tree can be discarded at any time.

use crate::error::{AllpacError, Result};
use crate::traits::AppContext;
use crate::ui as output;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run(ctx: &AppContext) -> Result<()> {
    clear_cache(&ctx.cache_dir)?;
    output::success(&format!("Cleared AUR build cache at {}", ctx.cache_dir.display()));
    Ok(())
}

/// Remove `dir` wholesale and recreate it empty. A missing directory is fine.
pub fn clear_cache(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => info!(dir = %dir.display(), "cache removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(AllpacError::IoError {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    }

    fs::create_dir_all(dir).map_err(|e| AllpacError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })
}
