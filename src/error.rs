//! Domain-specific error types for the mount reconciliation engine.
//!
//! Internal modules return typed errors ([`ConfigError`], [`ReconcileError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! Per-unit variants ([`ReconcileError::MalformedUnit`],
//! [`ReconcileError::DeviceUnreachable`], [`ReconcileError::OrphanedAutomount`],
//! [`ReconcileError::UnpairedMount`]) never abort a run;
//! [`ReconcileError::is_per_unit`] tells them apart from the whole-run
//! variants.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config file {}: {message}", .path.display())]
    InvalidSyntax {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The template source directory does not exist.
    #[error("Template directory not found: {}", .0.display())]
    MissingSourceDir(PathBuf),
}

/// Errors produced while reconciling unit templates with installed units.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The template has no `What=` line; the template itself is broken.
    #[error("malformed unit '{unit}': no What= line")]
    MalformedUnit {
        /// Template file name.
        unit: String,
    },

    /// The template is valid but its backing device is not present.
    #[error("device for '{unit}' is not reachable: {path}")]
    DeviceUnreachable {
        /// Template file name.
        unit: String,
        /// Path named by `What=`.
        path: String,
    },

    /// An automount template has no sibling mount template to drive.
    #[error("automount '{unit}' has no matching .mount template")]
    OrphanedAutomount {
        /// Template file name.
        unit: String,
    },

    /// A mount's paired automount was listed but could not be read.
    #[error("mount '{unit}' is driven by '{automount}', which could not be read")]
    UnpairedMount {
        /// Template file name of the mount.
        unit: String,
        /// Expected automount file name.
        automount: String,
    },

    /// The detected OS variant has no mount rules.
    #[error("platform '{platform}' is not supported for mount setup")]
    UnsupportedPlatform {
        /// Human-readable platform name.
        platform: String,
    },

    /// Network-share credentials could not be collected or stored.
    #[error("credential collection failed: {reason}")]
    CredentialCollectionFailed {
        /// Why collection failed.
        reason: String,
    },

    /// Installation stopped after some unit files may have been written.
    #[error(
        "installing units failed: {reason} (attempted: {}; files left in place: {})",
        .attempted.join(", "),
        .written.join(", ")
    )]
    PartialInstallFailure {
        /// Unit files written to the unit directory.
        written: Vec<String>,
        /// Unit names passed to the enable/start batch.
        attempted: Vec<String>,
        /// Failing step and its error text.
        reason: String,
    },

    /// Another run currently holds the run lock.
    #[error("another mounts run is in progress (lock held on {})", .path.display())]
    RunInProgress {
        /// Lock file path.
        path: PathBuf,
    },
}

impl ReconcileError {
    /// Whether this error only excludes a single unit instead of aborting the run.
    #[must_use]
    pub const fn is_per_unit(&self) -> bool {
        matches!(
            self,
            Self::MalformedUnit { .. }
                | Self::DeviceUnreachable { .. }
                | Self::OrphanedAutomount { .. }
                | Self::UnpairedMount { .. }
        )
    }
}
