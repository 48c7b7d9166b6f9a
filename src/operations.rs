//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that discovery, validation and
//! installation can be unit-tested without touching the real filesystem.
//! Production code uses [`SystemFileSystemOps`] or, when the unit directory
//! needs root, [`ElevatedFileSystemOps`]; tests use `MockFileSystemOps`.

use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::exec::Executor;

/// Abstraction over the filesystem queries and writes the engine performs.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Read a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not UTF-8.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Create or replace `path` with `content`, leaving it with `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or its mode set.
    fn write_file(&self, path: &Path, content: &str, mode: u32) -> Result<()>;

    /// Remove the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|e| e.map(|entry| entry.path()).map_err(Into::into))
            .collect()
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        write_with_mode(path, content, mode)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing {}", path.display()))
    }
}

#[cfg(unix)]
fn write_with_mode(path: &Path, content: &str, mode: u32) -> Result<()> {
    use std::os::unix::fs::{OpenOptionsExt as _, PermissionsExt as _};

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    // `mode` only applies on creation; an existing file keeps its old bits.
    file.set_permissions(std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("set permissions: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(not(unix))]
fn write_with_mode(path: &Path, content: &str, _mode: u32) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

/// [`FileSystemOps`] that performs writes and removals through `sudo`.
///
/// Reads go straight to the filesystem. Writes are staged in a temporary
/// file and moved into place with `sudo install -m <mode> -o root -g root`,
/// so the target never exists with the wrong mode or owner.
#[derive(Debug, Clone)]
pub struct ElevatedFileSystemOps {
    executor: Arc<dyn Executor>,
}

impl ElevatedFileSystemOps {
    /// Wrap an executor used to run `sudo`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl FileSystemOps for ElevatedFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        SystemFileSystemOps.read_dir(path)
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        let mut staged = tempfile::NamedTempFile::new().context("creating staging file")?;
        staged
            .write_all(content.as_bytes())
            .context("writing staging file")?;
        staged.flush().context("flushing staging file")?;

        let mode = format!("{mode:o}");
        let src = staged.path().to_string_lossy().to_string();
        let dst = path.to_string_lossy().to_string();
        self.executor
            .run(
                "sudo",
                &["install", "-m", &mode, "-o", "root", "-g", "root", &src, &dst],
            )
            .with_context(|| format!("installing {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let target = path.to_string_lossy().to_string();
        self.executor
            .run("sudo", &["rm", "-f", "--", &target])
            .with_context(|| format!("removing {}", path.display()))?;
        Ok(())
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure existing paths, file contents and directory listings using
/// the builder-style methods. Writes and removals are recorded and can be
/// inspected afterwards.
///
/// # Example
///
/// ```ignore
/// use mounts_cli::operations::MockFileSystemOps;
///
/// let fs = MockFileSystemOps::new()
///     .with_file("/src/mnt-home.mount", "[Mount]\nWhat=//nas/home\n")
///     .with_existing("/dev/sda1");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    existing: std::collections::HashSet<PathBuf>,
    contents: std::collections::HashMap<PathBuf, String>,
    unreadable: std::collections::HashSet<PathBuf>,
    failing_removals: std::collections::HashSet<PathBuf>,
    dirs: std::collections::BTreeMap<PathBuf, Vec<PathBuf>>,
    written: std::sync::Mutex<Vec<(PathBuf, String, u32)>>,
    removed: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as existing without giving it content.
    #[must_use]
    pub fn with_existing(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.insert(path.into());
        self
    }

    /// Register a readable file and list it in its parent directory.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        let p = path.into();
        self.list_in_parent(&p);
        self.existing.insert(p.clone());
        self.contents.insert(p, content.to_string());
        self
    }

    /// Register a file that is listed but fails to read.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        let p = path.into();
        self.list_in_parent(&p);
        self.existing.insert(p.clone());
        self.unreadable.insert(p);
        self
    }

    /// Register an empty directory.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let d = dir.into();
        self.existing.insert(d.clone());
        self.dirs.entry(d).or_default();
        self
    }

    /// Make [`FileSystemOps::remove`] fail for `path`.
    #[must_use]
    pub fn with_failing_removal(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_removals.insert(path.into());
        self
    }

    /// All `(path, content, mode)` triples written so far.
    pub fn written(&self) -> Vec<(PathBuf, String, u32)> {
        self.written.lock().expect("mock written poisoned").clone()
    }

    /// All paths removed so far.
    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().expect("mock removed poisoned").clone()
    }

    fn list_in_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.existing.insert(parent.to_path_buf());
            let entries = self.dirs.entry(parent.to_path_buf()).or_default();
            if !entries.iter().any(|e| e == path) {
                entries.push(path.to_path_buf());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        let removed = self.removed.lock().expect("mock removed poisoned");
        let written = self.written.lock().expect("mock written poisoned");
        (self.existing.contains(path) && !removed.iter().any(|p| p == path))
            || written.iter().any(|(p, _, _)| p == path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.dirs
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("mock: no entries configured for {}", path.display()))
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        if self.unreadable.contains(path) {
            return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        }
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    fn write_file(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        self.written.lock().expect("mock written poisoned").push((
            path.to_path_buf(),
            content.to_string(),
            mode,
        ));
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        if self.failing_removals.contains(path) {
            anyhow::bail!("mock: cannot remove {}", path.display());
        }
        self.removed
            .lock()
            .expect("mock removed poisoned")
            .push(path.to_path_buf());
        Ok(())
    }
}
