//! Top-level subcommand orchestration.
pub mod apply;
pub mod plan;
pub mod remove;
pub mod version;

use anyhow::{Context as _, Result};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::{CONFIG_ENV, Config, Escalation};
use crate::error::ReconcileError;
use crate::exec::{Executor, SystemExecutor};
use crate::lock::RunLock;
use crate::logging::{Log, Logger, TaskStatus};
use crate::platform::Platform;
use crate::tasks::{self, Context, Task};

/// Configuration and platform shared by every command.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Arc<Platform>,
    /// Loaded configuration.
    pub config: Arc<Config>,
}

impl CommandSetup {
    /// Load the configuration and detect the platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory is unavailable or the
    /// config file exists but cannot be parsed.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let env_value = std::env::var(CONFIG_ENV).ok();
        let path = Config::resolve_path(global.config.as_deref(), env_value.as_deref());
        let cwd = std::env::current_dir().context("determining working directory")?;

        log.stage("Loading configuration");
        let config = Config::load(&path, &cwd)?;
        log.debug(&format!("config file: {}", path.display()));
        log.debug(&format!("templates: {}", config.source_dir.display()));
        log.debug(&format!("unit directory: {}", config.unit_dir.display()));

        let platform = Platform::detect();
        log.info(&format!("platform: {} ({})", platform.name, platform.variant));

        Ok(Self {
            platform: Arc::new(platform),
            config: Arc::new(config),
        })
    }

    /// Production task context for this setup.
    #[must_use]
    pub fn context(&self, dry_run: bool, log: &Arc<Logger>) -> Context {
        Context::new(
            Arc::clone(&self.config),
            Arc::clone(&self.platform),
            Arc::clone(log) as Arc<dyn Log>,
            dry_run,
            Arc::new(SystemExecutor),
        )
    }
}

/// Fail unless the platform has a path rule.
///
/// # Errors
///
/// Returns [`ReconcileError::UnsupportedPlatform`] otherwise.
pub fn ensure_supported(platform: &Platform) -> Result<(), ReconcileError> {
    if platform.is_supported() {
        Ok(())
    } else {
        Err(ReconcileError::UnsupportedPlatform {
            platform: format!("{} ({})", platform.name, platform.variant),
        })
    }
}

/// Programs a real run shells out to.
fn required_tools(escalation: Escalation) -> &'static [&'static str] {
    match escalation {
        Escalation::None => &["systemctl"],
        Escalation::Sudo => &["systemctl", "sudo"],
    }
}

/// Fail if a program needed to change the system is missing from `PATH`.
///
/// Dry runs never shell out, so they skip the check.
///
/// # Errors
///
/// Returns an error naming the first missing program.
pub fn ensure_tools(executor: &dyn Executor, escalation: Escalation, dry_run: bool) -> Result<()> {
    if dry_run {
        return Ok(());
    }
    if let Some(missing) = required_tools(escalation)
        .iter()
        .find(|tool| !executor.which(tool))
    {
        anyhow::bail!("required program not found on PATH: {missing}");
    }
    Ok(())
}

/// Take the run lock unless this is a dry run.
///
/// # Errors
///
/// Returns [`ReconcileError::RunInProgress`] if another run holds it.
pub fn lock_for(ctx: &Context) -> Result<Option<RunLock>> {
    if ctx.dry_run {
        return Ok(None);
    }
    let lock = RunLock::acquire(&ctx.config.lock_path)?;
    ctx.log
        .debug(&format!("holding run lock {}", lock.path().display()));
    Ok(Some(lock))
}

/// Ask `message` unless `--yes` or dry-run already answered it.
///
/// # Errors
///
/// Returns an error if the prompt cannot be shown.
pub fn confirmed(ctx: &Context, message: &str, yes: bool) -> Result<bool> {
    if yes || ctx.dry_run {
        return Ok(true);
    }
    let answer = ctx.prompt.confirm(message)?;
    if !answer {
        ctx.log.info("aborted");
    }
    Ok(answer)
}

/// Execute tasks in order, print the summary, and bail if any task failed.
///
/// A failed task stops the run; the tasks after it are recorded as skipped.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let mut failed: Option<&str> = None;
    for task in tasks {
        match failed {
            None => {
                if !tasks::execute(task, ctx) {
                    failed = Some(task.name());
                }
            }
            Some(earlier) => {
                let reason = format!("{earlier} failed");
                ctx.log
                    .warn(&format!("skipping {}: {reason}", task.name()));
                ctx.log
                    .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            }
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}
