//! Run configuration: where templates live and where units are installed.
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "MOUNTS_CONFIG";

/// Config file used when neither `--config` nor `MOUNTS_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mounts/config.toml";

const DEFAULT_SOURCE_DIR: &str = "mounts";
const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";
const DEFAULT_CREDENTIALS_PATH: &str = "/etc/.smb-credentials";
const DEFAULT_LOCK_PATH: &str = "/run/lock/mounts.lock";

/// How privileged writes and service-manager calls are performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escalation {
    /// Run directly (the process is already root, or targets are writable).
    #[default]
    None,
    /// Prefix privileged operations with `sudo`.
    Sudo,
}

/// On-disk shape of the config file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    source_dir: Option<PathBuf>,
    unit_dir: Option<PathBuf>,
    credentials_path: Option<PathBuf>,
    lock_path: Option<PathBuf>,
    escalation: Option<Escalation>,
}

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the `mnt-*` unit templates.
    pub source_dir: PathBuf,
    /// System unit directory the templates are installed into.
    pub unit_dir: PathBuf,
    /// Shared network-share credentials file.
    pub credentials_path: PathBuf,
    /// Sentinel file locked for the duration of a run.
    pub lock_path: PathBuf,
    /// Privilege escalation for writes and `systemctl`.
    pub escalation: Escalation,
}

impl Config {
    /// Load the config file at `path`; a missing file yields defaults.
    ///
    /// A relative `source_dir` is resolved against the directory holding the
    /// config file, or against `cwd` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path, cwd: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml_loader::load_config(path)?;
        let base = if path.exists() {
            path.parent().unwrap_or(cwd)
        } else {
            cwd
        };

        let source_dir = raw
            .source_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));
        let source_dir = if source_dir.is_absolute() {
            source_dir
        } else {
            base.join(source_dir)
        };

        Ok(Self {
            source_dir,
            unit_dir: raw
                .unit_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UNIT_DIR)),
            credentials_path: raw
                .credentials_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            lock_path: raw
                .lock_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCK_PATH)),
            escalation: raw.escalation.unwrap_or_default(),
        })
    }

    /// Pick the config file path: explicit flag, then `MOUNTS_CONFIG`, then
    /// [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>, env_value: Option<&str>) -> PathBuf {
        explicit.map_or_else(
            || {
                env_value
                    .filter(|v| !v.is_empty())
                    .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
            },
            Path::to_path_buf,
        )
    }
}
