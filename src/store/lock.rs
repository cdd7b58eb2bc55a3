//! store::lock
//!
//! Exclusive workspace lock held while saving.
//!
//! # Architecture
//!
//! The core engine is single-writer by contract; the lock only guards
//! the persistence boundary against another *process* saving the same
//! workspace directory concurrently.
//!
//! # Invariants
//!
//! - Lock is held for the entire save
//! - Lock is released on drop (RAII pattern)
//! - Acquisition is non-blocking (fails fast if locked)

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::WorkspacePaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("workspace is locked by another trellis process")]
    AlreadyLocked,

    /// Failed to create the lock file.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// I/O error during lock operations.
    #[error("lock i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// An exclusive lock on a workspace directory.
///
/// The lock is released when the guard is dropped, including on panic.
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
    file: Option<File>,
}

impl WorkspaceLock {
    /// Attempt to acquire the workspace lock.
    ///
    /// Uses OS-level file locking via `fs2`, which works across
    /// processes. Non-blocking: if another process holds the lock this
    /// returns [`LockError::AlreadyLocked`] immediately.
    pub fn acquire(paths: &WorkspacePaths) -> Result<Self, LockError> {
        let path = paths.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| LockError::CreateFailed(format!("cannot create {}: {}", path.display(), e)))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(_) => Err(LockError::AlreadyLocked),
        }
    }

    /// Whether this guard currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// The lock file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_reacquire_after_drop() {
        let dir = tempfile::tempdir().unwrap();
        let paths = WorkspacePaths::new(dir.path());

        let lock = WorkspaceLock::acquire(&paths).unwrap();
        assert!(lock.is_held());
        drop(lock);

        let lock = WorkspaceLock::acquire(&paths).unwrap();
        assert!(lock.is_held());
    }

    #[test]
    fn second_handle_in_same_process_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let paths = WorkspacePaths::new(dir.path());

        let _held = WorkspaceLock::acquire(&paths).unwrap();
        // fs2 exclusive locks are per file handle, so a second acquire
        // fails even within one process.
        assert!(matches!(
            WorkspaceLock::acquire(&paths),
            Err(LockError::AlreadyLocked)
        ));
    }
}
