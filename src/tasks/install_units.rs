//! Task: provision credentials, write planned units, reload, enable.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::credentials;
use crate::error::ReconcileError;
use crate::units::plan::InstallPlan;

/// Mode of installed unit files.
pub const UNIT_MODE: u32 = 0o644;

/// Install every unit of an [`InstallPlan`] and enable them as one batch.
#[derive(Debug, Clone)]
pub struct InstallUnits {
    plan: InstallPlan,
}

impl InstallUnits {
    /// Wrap a plan built earlier in the run.
    #[must_use]
    pub const fn new(plan: InstallPlan) -> Self {
        Self { plan }
    }

    fn dry_run(&self, ctx: &Context) {
        if self.plan.requires_credentials() {
            ctx.log.dry_run(&format!(
                "would prompt for network share credentials and write {}",
                ctx.config.credentials_path.display()
            ));
        }
        for unit in &self.plan.units {
            ctx.log.dry_run(&format!(
                "would write {}",
                ctx.config.unit_dir.join(&unit.final_name).display()
            ));
        }
        ctx.log.dry_run("would reload systemd");
        ctx.log.dry_run(&format!(
            "would enable --now {}",
            self.plan.unit_names().join(" ")
        ));
    }
}

impl Task for InstallUnits {
    fn name(&self) -> &'static str {
        "Install units"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if self.plan.is_empty() {
            return Ok(TaskResult::Skipped("nothing to install".to_string()));
        }
        if ctx.dry_run {
            self.dry_run(ctx);
            return Ok(TaskResult::DryRun);
        }

        if self.plan.requires_credentials() {
            ctx.log.info("network share units need credentials");
            credentials::provision(
                ctx.prompt.as_ref(),
                ctx.fs_ops.as_ref(),
                &ctx.config.credentials_path,
                ctx.log.as_ref(),
            )?;
        }

        let attempted = self.plan.unit_names();
        let partial = |written: &[String], reason: String| ReconcileError::PartialInstallFailure {
            written: written.to_vec(),
            attempted: attempted.clone(),
            reason,
        };

        let mut written = Vec::with_capacity(self.plan.units.len());
        for unit in &self.plan.units {
            let path = ctx.config.unit_dir.join(&unit.final_name);
            ctx.fs_ops
                .write_file(&path, &unit.final_content, UNIT_MODE)
                .map_err(|e| partial(&written, format!("writing {}: {e:#}", path.display())))?;
            ctx.log.debug(&format!("wrote {}", path.display()));
            written.push(unit.final_name.clone());
        }

        ctx.service
            .daemon_reload()
            .map_err(|e| partial(&written, format!("reload: {e:#}")))?;
        ctx.service
            .enable_now(&attempted)
            .map_err(|e| partial(&written, format!("enable: {e:#}")))?;

        ctx.log.info(&format!("enabled {}", attempted.join(", ")));
        Ok(TaskResult::Ok)
    }
}
