use crate::error::{AllpacError, Result};
use crate::project_identity;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive, process-wide lock held for the duration of a mutating command.
///
/// Released when dropped. The lock file itself is left in place: deleting it
/// would let a second process lock a fresh inode while a third still holds
/// the old one.
pub struct ProcessLock {
    file: fs::File,
    path: PathBuf,
}

impl ProcessLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Take the lock at `lock_path` without waiting.
pub fn acquire_lock(lock_path: &Path) -> Result<ProcessLock> {
    if let Some(dir) = lock_path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| AllpacError::IoError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    let mut lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| AllpacError::IoError {
            path: lock_path.to_path_buf(),
            source: e,
        })?;

    if lock_file.try_lock_exclusive().is_err() {
        return Err(AllpacError::LockError(format!(
            "Another {} process is currently running.\n\
             Lock file: {}\n\
             Wait for it to complete and retry.",
            project_identity::BINARY_NAME,
            lock_path.display(),
        )));
    }

    let _ = lock_file.set_len(0);
    let _ = writeln!(lock_file, "{}", std::process::id());

    Ok(ProcessLock {
        file: lock_file,
        path: lock_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::acquire_lock;
    use tempfile::tempdir;

    #[test]
    fn lock_contention_returns_error() {
        let dir = tempdir().expect("tempdir");
        let lock_path = dir.path().join("allpac.lock");

        let lock = acquire_lock(&lock_path).expect("first lock");
        assert_eq!(lock.path(), lock_path.as_path());
        match acquire_lock(&lock_path) {
            Ok(_) => panic!("second lock should fail"),
            Err(err) => assert!(err.to_string().contains("currently running")),
        }
    }

    #[test]
    fn lock_is_reusable_after_drop() {
        let dir = tempdir().expect("tempdir");
        let lock_path = dir.path().join("allpac.lock");

        drop(acquire_lock(&lock_path).expect("first lock"));
        assert!(acquire_lock(&lock_path).is_ok());
    }
}
