//! Advisory locking for the workspace root
//!
//! Two concurrent ginstall runs in the same workspace would both rewrite the
//! root package.json and both try to relocate the same `.git` directories.
//! An advisory file lock makes the second run fail fast instead.

use std::fs;
use std::path::{Path, PathBuf};

use fslock::LockFile;

use crate::error::{GinstallError, Result};

/// Lock filename, created next to the root package.json
pub const LOCK_FILE: &str = ".ginstall.lock";

/// RAII guard for the workspace lock
///
/// Acquires an advisory file lock on creation and releases it on drop.
#[derive(Debug)]
pub struct WorkspaceGuard {
    lock: LockFile,
    lock_path: PathBuf,
}

impl WorkspaceGuard {
    /// Acquire the workspace lock without blocking
    pub fn acquire(root: &Path) -> Result<Self> {
        let lock_path = root.join(LOCK_FILE);

        let mut lock = LockFile::open(&lock_path).map_err(|e| GinstallError::WorkspaceLockFailed {
            reason: format!("Failed to open lock file: {}", e),
        })?;

        let acquired = lock
            .try_lock()
            .map_err(|e| GinstallError::WorkspaceLockFailed {
                reason: format!("Failed to acquire lock: {}", e),
            })?;

        if !acquired {
            return Err(GinstallError::WorkspaceLockFailed {
                reason: "workspace is locked by another ginstall run".to_string(),
            });
        }

        Ok(Self { lock, lock_path })
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        let _ = self.lock.unlock();

        // Remove the lock file - it will be recreated when needed
        let _ = fs::remove_file(&self.lock_path);
    }
}
