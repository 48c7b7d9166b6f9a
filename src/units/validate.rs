//! Device validation: is the resource behind `What=` reachable right now?
use serde::Serialize;
use std::path::Path;

use super::UnitTemplate;
use crate::error::ReconcileError;
use crate::operations::FileSystemOps;

/// Prefix marking a network share (`//host/share`).
const NETWORK_SHARE_PREFIX: &str = "//";

/// The backing resource referenced by a unit's `What=` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceTarget {
    /// Local device/file path or network share URI.
    pub path: String,
    /// Whether the unit may be installed.
    pub reachable: bool,
}

impl DeviceTarget {
    /// Whether the target is a network share rather than a local path.
    #[must_use]
    pub fn is_network_share(&self) -> bool {
        is_share_uri(&self.path)
    }
}

/// Whether a `What=` value names a network share (`//host/share`).
#[must_use]
pub fn is_share_uri(path: &str) -> bool {
    path.starts_with(NETWORK_SHARE_PREFIX)
}

/// Value of the first line whose trimmed form starts with `What=`.
#[must_use]
pub fn what_value(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("What="))
        .map(str::trim)
}

/// Resolve a template's device and decide whether it is reachable.
///
/// Network shares are always reachable; the OS reports problems with them at
/// mount time. Local paths are reachable iff they exist.
///
/// # Errors
///
/// Returns [`ReconcileError::MalformedUnit`] when the template has no
/// `What=` line.
pub fn validate(
    template: &UnitTemplate,
    fs: &dyn FileSystemOps,
) -> Result<DeviceTarget, ReconcileError> {
    let path = what_value(&template.raw_content).ok_or_else(|| ReconcileError::MalformedUnit {
        unit: template.name.clone(),
    })?;

    let reachable = is_share_uri(path) || fs.exists(Path::new(path));
    Ok(DeviceTarget {
        path: path.to_string(),
        reachable,
    })
}
