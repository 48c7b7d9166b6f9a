//! Command: reconcile installed mount units with the templates.
use anyhow::Result;
use std::sync::Arc;

use super::plan::plan_units;
use super::{confirmed, ensure_supported, ensure_tools, lock_for, run_tasks};
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::logging::Logger;
use crate::tasks::install_units::InstallUnits;
use crate::tasks::remove_units::RemoveInstalledUnits;
use crate::tasks::{Context, Task};

/// Question asked before anything is changed.
pub const CONFIRM_APPLY: &str = "Set up external filesystem mounts?";

/// Run one full reconciliation against `ctx`.
///
/// Phases run in order: plan, remove installed units, provision
/// credentials, install and enable. An unsupported platform aborts before
/// the lock is taken or anything is touched; a failed removal phase skips
/// installation.
///
/// # Errors
///
/// Returns an error if the platform is unsupported, another run holds the
/// lock, planning fails, or any task fails.
pub fn reconcile(ctx: &Context, log: &Logger) -> Result<()> {
    ensure_supported(&ctx.platform)?;
    let _lock = lock_for(ctx)?;

    let plan = plan_units(ctx)?;
    let remove = RemoveInstalledUnits;
    let install = InstallUnits::new(plan);
    run_tasks([&remove as &dyn Task, &install], ctx, log)
}

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if configuration loading or reconciliation fails.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    ensure_supported(&setup.platform)?;
    let ctx = setup.context(global.dry_run, log);
    ensure_tools(ctx.executor.as_ref(), ctx.config.escalation, ctx.dry_run)?;
    if !confirmed(&ctx, CONFIRM_APPLY, opts.yes)? {
        return Ok(());
    }
    reconcile(&ctx, log)
}
