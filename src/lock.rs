//! Cache directory locking
//!
//! Two flyenv invocations may race to populate the same cache directory.
//! An exclusive lock file per directory serializes the check-then-populate
//! sequence; the guard releases the lock on every exit path.
//!
//! The lock file is never unlinked: every acquirer, including one that was
//! blocked waiting, must contend on the same inode. A crashed holder's lock
//! is released by the OS when its file handle closes, so a leftover lock
//! file carries no lock.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::path::Path;

/// Name of the lock file inside a cache directory
const LOCK_FILE_NAME: &str = ".flyenv.lock";

/// Acquire an exclusive lock on a cache directory. Blocks until any other
/// flyenv invocation populating the same directory has finished.
/// Returns a guard that releases the lock when dropped.
pub fn acquire_dir_lock(dir: &Path) -> Result<DirLock> {
    let lock_path = dir.join(LOCK_FILE_NAME);

    let lock_file = File::options()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .with_context(|| format!("failed to create lock file: {}", lock_path.display()))?;

    lock_file
        .lock_exclusive()
        .with_context(|| format!("failed to lock cache directory: {}", dir.display()))?;

    Ok(DirLock { _file: lock_file })
}

/// RAII guard for a cache directory lock - releases the lock when dropped.
/// The lock file itself stays in place.
#[derive(Debug)]
pub struct DirLock {
    _file: File,
}
