//! Command: remove every installed managed unit.
use anyhow::Result;
use std::sync::Arc;

use super::{confirmed, ensure_supported, ensure_tools, lock_for, run_tasks};
use crate::cli::{GlobalOpts, RemoveOpts};
use crate::logging::Logger;
use crate::tasks::remove_units::RemoveInstalledUnits;
use crate::tasks::{Context, Task};

/// Question asked before anything is removed.
pub const CONFIRM_REMOVE: &str = "Remove installed mount units?";

/// Remove all managed units from the unit directory.
///
/// # Errors
///
/// Returns an error if the platform is unsupported, another run holds the
/// lock, or the removal task fails.
pub fn remove_all(ctx: &Context, log: &Logger) -> Result<()> {
    ensure_supported(&ctx.platform)?;
    let _lock = lock_for(ctx)?;
    run_tasks([&RemoveInstalledUnits as &dyn Task], ctx, log)
}

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if configuration loading or removal fails.
pub fn run(global: &GlobalOpts, opts: &RemoveOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    ensure_supported(&setup.platform)?;
    let ctx = setup.context(global.dry_run, log);
    ensure_tools(ctx.executor.as_ref(), ctx.config.escalation, ctx.dry_run)?;
    if !confirmed(&ctx, CONFIRM_REMOVE, opts.yes)? {
        return Ok(());
    }
    remove_all(&ctx, log)
}
