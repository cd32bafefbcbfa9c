mod backup_ops;
mod load_recovery;
mod locking;
mod persist;

use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::state::types::{PackageList, PackageRecord};
use crate::utils::paths;
use backup_ops::{restore_from_backup, rotate_backups};
use load_recovery::read_package_list;
pub use locking::{ProcessLock, acquire_lock};
use persist::write_list_atomically;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Persisted package list with serialized mutations.
///
/// Reads parse the file into an immutable snapshot and never block. Every
/// mutation goes through [`RecordStore::update`], which holds the store's
/// write guard across the whole load-modify-save cycle, so concurrent
/// upserts from worker threads cannot lose each other's writes.
/// Cross-process exclusion is the caller's job (see [`acquire_lock`]).
pub struct RecordStore {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl RecordStore {
    /// Open the store backed by `path`, creating its directory if needed.
    /// The file itself is created lazily by the first [`load`](Self::load).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let dir = path.parent().ok_or_else(|| {
            AllpacError::PathError(format!(
                "Invalid package list path (no parent directory): {}",
                path.display()
            ))
        })?;
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| AllpacError::IoError {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        Ok(Self {
            path,
            write_guard: Mutex::new(()),
        })
    }

    /// Open `~/.allpac/pkg.list` (or `$ALLPAC_HOME/pkg.list`)
    pub fn open_default() -> Result<Self> {
        Self::open(paths::package_list_file()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current mapping. A missing file is first use, not an error: it is
    /// initialized to `{}` and an empty list is returned.
    pub fn load(&self) -> Result<PackageList> {
        if let Some(list) = read_package_list(&self.path)? {
            return Ok(list);
        }

        let _guard = self.lock_writes()?;
        // Another thread may have created it while we waited
        if let Some(list) = read_package_list(&self.path)? {
            return Ok(list);
        }
        info!(path = %self.path.display(), "package list missing, initializing");
        write_list_atomically(&self.path, &PackageList::new())?;
        Ok(PackageList::new())
    }

    /// Atomically replace the persisted mapping
    pub fn save(&self, list: &PackageList) -> Result<()> {
        let _guard = self.lock_writes()?;
        self.persist(list)
    }

    pub fn get(&self, name: &str) -> Result<Option<PackageRecord>> {
        Ok(self.load()?.get(name).cloned())
    }

    /// Insert or overwrite a record; returns the previous one
    pub fn upsert(
        &self,
        name: &str,
        source: Source,
        version: impl Into<String>,
    ) -> Result<Option<PackageRecord>> {
        let record = PackageRecord::new(source, version);
        debug!(package = name, source = %source, version = %record.version, "upsert record");
        self.update(|list| list.insert(name, record))
    }

    /// Delete a record. Returns whether one existed; removing an unknown
    /// name is a no-op and leaves the file untouched.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let removed = self.update(|list| list.remove(name).is_some())?;
        if removed {
            debug!(package = name, "removed record");
        }
        Ok(removed)
    }

    /// The single mutation path: load, apply `f`, save if anything changed.
    pub fn update<R>(&self, f: impl FnOnce(&mut PackageList) -> R) -> Result<R> {
        let _guard = self.lock_writes()?;
        let before = read_package_list(&self.path)?.unwrap_or_default();
        let mut list = before.clone();
        let out = f(&mut list);
        if list != before {
            self.persist(&list)?;
        }
        Ok(out)
    }

    /// Replace the file with the newest parseable backup, if there is one
    pub fn restore_from_backup(&self) -> Result<Option<PackageList>> {
        let _guard = self.lock_writes()?;
        restore_from_backup(&self.path)
    }

    /// Overwrite the file with an empty list
    pub fn reinitialize(&self) -> Result<()> {
        let _guard = self.lock_writes()?;
        write_list_atomically(&self.path, &PackageList::new())
    }

    fn persist(&self, list: &PackageList) -> Result<()> {
        rotate_backups(&self.path)?;
        write_list_atomically(&self.path, list)
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_guard
            .lock()
            .map_err(|e| AllpacError::LockError(format!("package list guard poisoned: {}", e)))
    }
}
