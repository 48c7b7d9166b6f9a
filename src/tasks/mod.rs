//! Named phases of a reconciliation run.
pub mod context;
pub mod install_units;
pub mod remove_units;

pub use context::Context;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Outcome of a task that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task changed the system.
    Ok,
    /// Task had nothing to do.
    Skipped(String),
    /// Task only logged what it would do.
    DryRun,
}

/// A named, executable phase.
pub trait Task: Send + Sync {
    /// Name shown in stage headers and the summary.
    fn name(&self) -> &str;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase fails as a whole; per-unit problems are
    /// logged and do not surface here.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Execute a task, recording the result in the logger.
///
/// Returns `false` if the task failed.
#[must_use]
pub fn execute(task: &dyn Task, ctx: &Context) -> bool {
    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            return false;
        }
    }
    true
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;
    use crate::service::MockServiceManager;
    use std::sync::Arc;
    use test_helpers::{make_context, silent_prompt};

    struct FixedTask {
        result: Result<TaskResult, String>,
    }

    impl Task for FixedTask {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn ctx() -> (Context, Arc<crate::logging::Logger>) {
        make_context(
            Arc::new(MockFileSystemOps::new()),
            MockServiceManager::new(),
            silent_prompt(),
            false,
        )
    }

    #[test]
    fn execute_reports_failure() {
        let (ctx, _log) = ctx();
        assert!(execute(
            &FixedTask {
                result: Ok(TaskResult::DryRun)
            },
            &ctx
        ));
        assert!(!execute(
            &FixedTask {
                result: Err("kaboom".to_string())
            },
            &ctx
        ));
    }

    #[test]
    fn statuses_are_recorded() {
        let (ctx, log) = ctx();
        for result in [
            Ok(TaskResult::Ok),
            Ok(TaskResult::Skipped("nothing to install".to_string())),
            Ok(TaskResult::DryRun),
            Err("kaboom".to_string()),
        ] {
            let _ = execute(&FixedTask { result }, &ctx);
        }
        let statuses: Vec<_> = log.task_entries().iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![
                TaskStatus::Ok,
                TaskStatus::Skipped,
                TaskStatus::DryRun,
                TaskStatus::Failed
            ]
        );
        assert_eq!(log.failure_count(), 1);
        assert_eq!(log.task_entries()[3].message.as_deref(), Some("kaboom"));
    }
}
