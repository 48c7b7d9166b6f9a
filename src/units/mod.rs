//! Unit templates: discovery, device validation, OS path rules and planning.
//!
//! The pieces are layered leaves-first:
//!
//! - **[`validate`]**: resolve a template's `What=` line to a [`DeviceTarget`](validate::DeviceTarget)
//! - **[`transform`]**: apply the [`PathRule`](crate::platform::PathRule) of an OS variant
//! - **[`discover`]**: read `mnt-*` templates from the source directory
//! - **[`plan`]**: combine the above into an [`InstallPlan`](plan::InstallPlan)
pub mod discover;
pub mod plan;
pub mod transform;
pub mod validate;

use std::fmt;

/// Name prefix every managed template carries.
pub const TEMPLATE_PREFIX: &str = "mnt-";

/// Kind of systemd unit, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// `.mount`
    Mount,
    /// `.automount`
    Automount,
    /// `.swap`
    Swap,
}

impl UnitKind {
    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Automount => "automount",
            Self::Swap => "swap",
        }
    }

    /// Kind of a unit file name, or `None` for other extensions.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext {
            "mount" => Some(Self::Mount),
            "automount" => Some(Self::Automount),
            "swap" => Some(Self::Swap),
            _ => None,
        }
    }

    /// Whether units of this kind are disabled and stopped before removal.
    ///
    /// Mount units driven by an automount are never enabled directly, so
    /// only automount and swap units have enablement to undo.
    #[must_use]
    pub const fn needs_disable(self) -> bool {
        matches!(self, Self::Automount | Self::Swap)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether `name` follows the `mnt-<label>.{mount,automount,swap}` convention.
#[must_use]
pub fn is_template_name(name: &str) -> bool {
    UnitKind::from_file_name(name).is_some()
        && name
            .strip_prefix(TEMPLATE_PREFIX)
            .and_then(|rest| rest.rsplit_once('.'))
            .is_some_and(|(label, _)| !label.is_empty())
}

/// Whether an installed unit file name is managed by this tool.
///
/// Matches both naming conventions (`mnt-data.mount` and
/// `var-mnt-data.mount`) by looking for the marker anywhere in the name.
#[must_use]
pub fn is_managed_unit_name(name: &str) -> bool {
    name.contains(TEMPLATE_PREFIX) && UnitKind::from_file_name(name).is_some()
}

/// One declarative unit definition as authored in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTemplate {
    /// File name, e.g. `mnt-home.mount`.
    pub name: String,
    /// Unit kind from the extension.
    pub kind: UnitKind,
    /// Full unit file text.
    pub raw_content: String,
    /// Sibling `.automount` driving this mount, if one exists.
    pub paired_automount: Option<String>,
}

impl UnitTemplate {
    /// Build a template; pairing is filled in by discovery.
    #[must_use]
    pub fn new(name: &str, kind: UnitKind, raw_content: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            raw_content: raw_content.to_string(),
            paired_automount: None,
        }
    }

    /// File name without the extension (`mnt-home` for `mnt-home.mount`).
    #[must_use]
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }
}
