//! Task summary entries and the [`Log`] trait.

/// Outcome of one task, kept for the run summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name as shown in the summary.
    pub name: String,
    /// Final status.
    pub status: TaskStatus,
    /// Skip reason or error text.
    pub message: Option<String>,
}

/// Status of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task completed and changed the system.
    Ok,
    /// Task had nothing to do (empty plan, no installed units).
    Skipped,
    /// Task ran in dry-run mode; nothing was changed.
    DryRun,
    /// Task failed.
    Failed,
}

/// Logging backend used by reconciliation phases.
///
/// Phases take `&dyn Log` so they can be driven by the real [`Logger`](super::Logger)
/// or by a test double.
pub trait Log: Send + Sync {
    /// Log a stage header.
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (file only unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning.
    fn warn(&self, msg: &str);
    /// Log an error.
    fn error(&self, msg: &str);
    /// Log an action that dry-run mode skipped.
    fn dry_run(&self, msg: &str);
    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
