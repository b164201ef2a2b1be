//! Cross-process exclusive locking for cache slots.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;

/// An exclusive cross-process lock on one cache slot.
///
/// Acquisition blocks until the lock is free. The lock is released when the
/// guard is dropped, on every exit path including panics, and the OS
/// additionally releases it if the process dies with the file open.
pub struct CacheLock {
    /// Held open for the lifetime of the guard; closing releases the lock.
    file: File,
}

impl CacheLock {
    /// Acquires an exclusive lock on the given lock file, blocking until
    /// any current holder releases it.
    ///
    /// The lock file is created if it does not exist and is never deleted;
    /// its content is irrelevant, only the lock on it matters.
    pub fn acquire(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
