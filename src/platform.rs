//! OS variant detection and the per-variant path rules.
use std::fmt;
use std::path::Path;

/// Environment variable that overrides OS variant detection.
pub const VARIANT_ENV: &str = "MOUNTS_OS_VARIANT";

/// Distribution IDs whose root filesystem is read-only.
const IMMUTABLE_IDS: &[&str] = &[
    "bazzite",
    "bluefin",
    "aurora",
    "silverblue",
    "kinoite",
    "fedora-coreos",
];

/// Root layout of the running operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsVariant {
    /// Writable root; mount points live under `/mnt`.
    StandardRoot,
    /// Read-only root; mount points live under `/var/mnt`.
    ImmutableRoot,
    /// No systemd mount support (e.g. Darwin).
    Unsupported,
}

impl fmt::Display for OsVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StandardRoot => write!(f, "standard"),
            Self::ImmutableRoot => write!(f, "immutable"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

impl OsVariant {
    /// Parse an override value such as `standard` or `immutable`.
    #[must_use]
    pub fn from_override(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "standard-root" | "arch" => Some(Self::StandardRoot),
            "immutable" | "immutable-root" | "bazzite" => Some(Self::ImmutableRoot),
            "unsupported" | "darwin" => Some(Self::Unsupported),
            _ => None,
        }
    }

    /// Classify a Linux system from its `/etc/os-release` text.
    ///
    /// `ostree_booted` reflects the presence of `/run/ostree-booted`, which
    /// marks image-based systems even when the distribution ID is unknown.
    #[must_use]
    pub fn from_os_release(os_release: &str, ostree_booted: bool) -> Self {
        if ostree_booted {
            return Self::ImmutableRoot;
        }
        let id = os_release_value(os_release, "ID").unwrap_or_default();
        if IMMUTABLE_IDS.contains(&id.as_str()) {
            Self::ImmutableRoot
        } else {
            Self::StandardRoot
        }
    }

    /// The path rule for this variant, or `None` when mounts are unsupported.
    #[must_use]
    pub fn path_rule(self) -> Option<&'static PathRule> {
        PATH_RULES
            .iter()
            .find(|(variant, _)| *variant == self)
            .map(|(_, rule)| rule)
    }
}

/// Extract an unquoted value from `os-release` style `KEY=value` lines.
fn os_release_value(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        (k == key).then(|| v.trim().trim_matches('"').trim_matches('\'').to_string())
    })
}

/// A unit rename applied by a [`PathRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    /// Prefix removed from the template name when present.
    pub strip: &'static str,
    /// Prefix added to the (stripped) name.
    pub prepend: &'static str,
}

/// How unit content and names change for one OS variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRule {
    /// `(from, to)` path prefix rewrites applied to unit content.
    pub content: &'static [(&'static str, &'static str)],
    /// Optional rename of the installed unit file.
    pub rename: Option<Rename>,
}

/// Rule table. Adding a variant means adding a row.
const PATH_RULES: &[(OsVariant, PathRule)] = &[
    (
        OsVariant::StandardRoot,
        PathRule {
            content: &[],
            rename: None,
        },
    ),
    (
        OsVariant::ImmutableRoot,
        PathRule {
            content: &[("/mnt/", "/var/mnt/")],
            rename: Some(Rename {
                strip: "mnt-",
                prepend: "var-mnt-",
            }),
        },
    ),
];

/// Platform information for the current system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Root layout used for path rules.
    pub variant: OsVariant,
    /// Human-readable name (`PRETTY_NAME`, or the target OS).
    pub name: String,
}

impl Platform {
    /// Detect the current platform.
    ///
    /// `MOUNTS_OS_VARIANT` wins when set to a recognised value; otherwise
    /// non-Linux targets are [`OsVariant::Unsupported`] and Linux systems are
    /// classified from `/etc/os-release`.
    #[must_use]
    pub fn detect() -> Self {
        let env_override = std::env::var(VARIANT_ENV).ok();
        if cfg!(target_os = "linux") {
            let os_release = std::fs::read_to_string("/etc/os-release").unwrap_or_default();
            let ostree = Path::new("/run/ostree-booted").exists();
            Self::from_parts(env_override.as_deref(), Some(&os_release), ostree)
        } else {
            Self::from_parts(env_override.as_deref(), None, false)
        }
    }

    /// Classify from already-gathered facts; `os_release` is `None` off Linux.
    #[must_use]
    pub fn from_parts(env_override: Option<&str>, os_release: Option<&str>, ostree: bool) -> Self {
        let name = os_release
            .and_then(|c| os_release_value(c, "PRETTY_NAME").or_else(|| os_release_value(c, "ID")))
            .unwrap_or_else(|| std::env::consts::OS.to_string());
        let variant = env_override
            .and_then(OsVariant::from_override)
            .unwrap_or_else(|| {
                os_release.map_or(OsVariant::Unsupported, |c| {
                    OsVariant::from_os_release(c, ostree)
                })
            });
        Self { variant, name }
    }

    /// Create a platform with explicit values (for testing).
    #[must_use]
    pub fn new(variant: OsVariant, name: &str) -> Self {
        Self {
            variant,
            name: name.to_string(),
        }
    }

    /// Whether systemd mount units can be managed here.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.variant.path_rule().is_some()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const ARCH: &str = "NAME=\"Arch Linux\"\nPRETTY_NAME=\"Arch Linux\"\nID=arch\n";
    const BAZZITE: &str = "NAME=\"Bazzite\"\nPRETTY_NAME=\"Bazzite 41\"\nID=bazzite\nID_LIKE=\"fedora\"\n";

    #[test]
    fn arch_is_standard_root() {
        assert_eq!(
            OsVariant::from_os_release(ARCH, false),
            OsVariant::StandardRoot
        );
    }

    #[test]
    fn bazzite_is_immutable_root() {
        assert_eq!(
            OsVariant::from_os_release(BAZZITE, false),
            OsVariant::ImmutableRoot
        );
    }

    #[test]
    fn ostree_marker_forces_immutable_root() {
        assert_eq!(
            OsVariant::from_os_release(ARCH, true),
            OsVariant::ImmutableRoot
        );
    }

    #[test]
    fn non_linux_is_unsupported() {
        let p = Platform::from_parts(None, None, false);
        assert_eq!(p.variant, OsVariant::Unsupported);
        assert!(!p.is_supported());
    }

    #[test]
    fn env_override_wins() {
        let p = Platform::from_parts(Some("immutable"), Some(ARCH), false);
        assert_eq!(p.variant, OsVariant::ImmutableRoot);
        assert_eq!(p.name, "Arch Linux");
    }

    #[test]
    fn unknown_override_is_ignored() {
        let p = Platform::from_parts(Some("plan9"), Some(BAZZITE), false);
        assert_eq!(p.variant, OsVariant::ImmutableRoot);
        assert_eq!(p.name, "Bazzite 41");
    }

    #[test]
    fn every_supported_variant_has_a_rule() {
        assert!(OsVariant::StandardRoot.path_rule().is_some());
        assert!(OsVariant::ImmutableRoot.path_rule().is_some());
        assert!(OsVariant::Unsupported.path_rule().is_none());
    }

    #[test]
    fn standard_rule_is_identity() {
        let rule = OsVariant::StandardRoot.path_rule().unwrap();
        assert!(rule.content.is_empty());
        assert!(rule.rename.is_none());
    }

    #[test]
    fn os_variant_display() {
        assert_eq!(OsVariant::StandardRoot.to_string(), "standard");
        assert_eq!(OsVariant::ImmutableRoot.to_string(), "immutable");
        assert_eq!(OsVariant::Unsupported.to_string(), "unsupported");
    }
}
