//! Exclusive per-host run lock.
use anyhow::{Context as _, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::ReconcileError;

/// Advisory lock held for the whole of a run; released on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the lock at `path` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::RunInProgress`] if another run holds the
    /// lock, or an I/O error if the lock file cannot be opened.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating lock directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("opening lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            return Err(ReconcileError::RunInProgress {
                path: path.to_path_buf(),
            }
            .into());
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// The lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        FileExt::unlock(&self.file).ok();
    }
}
