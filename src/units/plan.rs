//! Install planning: validated, OS-transformed units ready to install.
use serde::Serialize;
use std::collections::BTreeMap;

use super::transform::{Transformed, rule_for, transform};
use super::validate::{DeviceTarget, validate};
use super::{UnitKind, UnitTemplate};
use crate::error::ReconcileError;
use crate::operations::FileSystemOps;
use crate::platform::OsVariant;

/// One unit that passed validation, ready to be written and enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedUnit {
    /// Template the unit came from.
    pub template: String,
    /// Installed file name after OS renaming.
    pub final_name: String,
    /// Installed file content after OS path rewriting.
    #[serde(skip)]
    pub final_content: String,
    /// Unit kind.
    pub kind: UnitKind,
    /// Backing device (an automount reports its mount's device).
    pub target: DeviceTarget,
    /// Whether this unit needs the shared credentials file.
    pub requires_credentials: bool,
}

/// A template left out of the plan, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    /// Template file name.
    pub unit: String,
    /// Per-unit reason.
    pub reason: ReconcileError,
}

/// The result of planning one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    /// Units to install, in template name order.
    pub units: Vec<PlannedUnit>,
    /// Templates excluded from installation.
    pub excluded: Vec<Exclusion>,
}

impl InstallPlan {
    /// Whether there is nothing to install.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether any planned unit needs the shared credentials file.
    #[must_use]
    pub fn requires_credentials(&self) -> bool {
        self.units.iter().any(|u| u.requires_credentials)
    }

    /// Installed file names in plan order.
    #[must_use]
    pub fn unit_names(&self) -> Vec<String> {
        self.units.iter().map(|u| u.final_name.clone()).collect()
    }
}

/// Whether a unit of `kind` backed by `target` needs network credentials.
///
/// Credentials are tied to the units systemd activates on its own
/// (automount and swap); a share-backed mount inherits them through its
/// automount.
fn needs_credentials(kind: UnitKind, target: &DeviceTarget) -> bool {
    target.is_network_share() && matches!(kind, UnitKind::Automount | UnitKind::Swap)
}

/// Validate and transform `templates` for `variant`.
///
/// Mount and swap units are validated on their own `What=` line. An
/// automount carries no device of its own: it follows its sibling mount, so
/// a mount and its automount are planned together or excluded together.
///
/// # Errors
///
/// Returns [`ReconcileError::UnsupportedPlatform`] when `variant` has no path
/// rule, before any template is inspected. Per-unit problems
/// ([`ReconcileError::is_per_unit`]) are recorded in
/// [`InstallPlan::excluded`] instead of failing.
pub fn build_plan(
    templates: impl IntoIterator<Item = UnitTemplate>,
    fs: &dyn FileSystemOps,
    variant: OsVariant,
) -> Result<InstallPlan, ReconcileError> {
    rule_for(variant)?;

    let templates: BTreeMap<String, UnitTemplate> = templates
        .into_iter()
        .map(|t| (t.name.clone(), t))
        .collect();

    // Device checks for every mount and swap, keyed by template name.
    let validations: BTreeMap<&str, Result<DeviceTarget, ReconcileError>> = templates
        .values()
        .filter(|t| t.kind != UnitKind::Automount)
        .map(|t| (t.name.as_str(), check_device(t, fs)))
        .collect();

    let mut plan = InstallPlan::default();
    for template in templates.values() {
        let outcome = match template.kind {
            UnitKind::Mount => validations
                .get(template.name.as_str())
                .cloned()
                .unwrap_or_else(|| check_device(template, fs))
                .and_then(|target| check_pairing(template, &templates).map(|()| target)),
            UnitKind::Swap => validations
                .get(template.name.as_str())
                .cloned()
                .unwrap_or_else(|| check_device(template, fs)),
            UnitKind::Automount => {
                let mount = format!("{}.{}", template.stem(), UnitKind::Mount.extension());
                validations.get(mount.as_str()).cloned().unwrap_or_else(|| {
                    Err(ReconcileError::OrphanedAutomount {
                        unit: template.name.clone(),
                    })
                })
            }
        };

        match outcome {
            Ok(target) => {
                let Transformed {
                    final_name,
                    final_content,
                } = transform(template, variant)?;
                plan.units.push(PlannedUnit {
                    template: template.name.clone(),
                    final_name,
                    final_content,
                    kind: template.kind,
                    requires_credentials: needs_credentials(template.kind, &target),
                    target,
                });
            }
            Err(reason) if reason.is_per_unit() => plan.excluded.push(Exclusion {
                unit: template.name.clone(),
                reason,
            }),
            Err(e) => return Err(e),
        }
    }

    Ok(plan)
}

/// Validate a mount or swap and turn an unreachable device into an exclusion.
fn check_device(
    template: &UnitTemplate,
    fs: &dyn FileSystemOps,
) -> Result<DeviceTarget, ReconcileError> {
    let target = validate(template, fs)?;
    if target.reachable {
        Ok(target)
    } else {
        Err(ReconcileError::DeviceUnreachable {
            unit: template.name.clone(),
            path: target.path,
        })
    }
}

/// A mount whose automount was listed must not be planned without it.
fn check_pairing(
    template: &UnitTemplate,
    templates: &BTreeMap<String, UnitTemplate>,
) -> Result<(), ReconcileError> {
    match &template.paired_automount {
        Some(automount) if !templates.contains_key(automount) => {
            Err(ReconcileError::UnpairedMount {
                unit: template.name.clone(),
                automount: automount.clone(),
            })
        }
        _ => Ok(()),
    }
}
