//! Task: remove previously installed managed units.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{Context, Task, TaskResult};
use crate::units::{UnitKind, is_managed_unit_name};

/// An installed unit file that this tool manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledUnit {
    /// File name in the unit directory.
    pub name: String,
    /// Unit kind from the extension.
    pub kind: UnitKind,
    /// Full path.
    pub path: PathBuf,
}

/// List the managed units in the configured unit directory, by name.
///
/// # Errors
///
/// Returns an error if the unit directory exists but cannot be listed.
pub fn installed_units(ctx: &Context) -> Result<Vec<InstalledUnit>> {
    let dir = &ctx.config.unit_dir;
    if !ctx.fs_ops.exists(dir) {
        return Ok(Vec::new());
    }
    let mut units: Vec<InstalledUnit> = ctx
        .fs_ops
        .read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            if !is_managed_unit_name(&name) {
                return None;
            }
            let kind = UnitKind::from_file_name(&name)?;
            Some(InstalledUnit { name, kind, path })
        })
        .collect();
    units.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(units)
}

/// Disable, stop and delete every managed unit, then reload once.
///
/// Per-unit failures are warnings; the loop always visits every unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveInstalledUnits;

impl RemoveInstalledUnits {
    fn remove_one(ctx: &Context, unit: &InstalledUnit) {
        if unit.kind.needs_disable() {
            if let Err(e) = ctx.service.disable(&unit.name) {
                ctx.log.warn(&format!("failed to disable {}: {e:#}", unit.name));
            }
            if let Err(e) = ctx.service.stop(&unit.name) {
                ctx.log.warn(&format!("failed to stop {}: {e:#}", unit.name));
            }
        }
        match ctx.fs_ops.remove(&unit.path) {
            Ok(()) => ctx.log.info(&format!("removed {}", unit.name)),
            Err(e) => ctx.log.warn(&format!("failed to remove {}: {e:#}", unit.name)),
        }
    }
}

impl Task for RemoveInstalledUnits {
    fn name(&self) -> &'static str {
        "Remove installed units"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let units = installed_units(ctx)?;
        if units.is_empty() {
            return Ok(TaskResult::Skipped("no installed units".to_string()));
        }

        if ctx.dry_run {
            for unit in &units {
                let steps = if unit.kind.needs_disable() {
                    "disable, stop and delete"
                } else {
                    "delete"
                };
                ctx.log.dry_run(&format!("would {steps} {}", unit.name));
            }
            ctx.log.dry_run("would reload systemd");
            return Ok(TaskResult::DryRun);
        }

        for unit in &units {
            Self::remove_one(ctx, unit);
        }
        ctx.service
            .daemon_reload()
            .context("reloading systemd after removal")?;
        ctx.log
            .debug(&format!("{} installed units removed", units.len()));
        Ok(TaskResult::Ok)
    }
}
