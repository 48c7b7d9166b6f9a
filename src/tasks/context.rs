//! Shared state handed to every task.
use std::sync::Arc;

use crate::config::{Config, Escalation};
use crate::credentials::{CredentialPrompt, InquirePrompt};
use crate::exec::Executor;
use crate::logging::Log;
use crate::operations::{ElevatedFileSystemOps, FileSystemOps, SystemFileSystemOps};
use crate::platform::Platform;
use crate::service::{ServiceManager, Systemctl};

/// Shared context for task execution.
pub struct Context {
    /// Resolved run configuration.
    pub config: Arc<Config>,
    /// Detected platform; its variant selects the path rule.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Log actions instead of performing them.
    pub dry_run: bool,
    /// Command executor.
    pub executor: Arc<dyn Executor>,
    /// Filesystem access, elevated when the config asks for `sudo`.
    pub fs_ops: Arc<dyn FileSystemOps>,
    /// Service manager used to reload, enable, disable and stop units.
    pub service: Arc<dyn ServiceManager>,
    /// Interactive prompts.
    pub prompt: Arc<dyn CredentialPrompt>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("executor", &"<dyn Executor>")
            .field("fs_ops", &"<dyn FileSystemOps>")
            .field("service", &"<dyn ServiceManager>")
            .field("prompt", &"<dyn CredentialPrompt>")
            .finish()
    }
}

impl Context {
    /// Wire production collaborators for `config`.
    ///
    /// With [`Escalation::Sudo`] both file writes and `systemctl` go through
    /// `sudo`.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let fs_ops: Arc<dyn FileSystemOps> = match config.escalation {
            Escalation::None => Arc::new(SystemFileSystemOps),
            Escalation::Sudo => Arc::new(ElevatedFileSystemOps::new(Arc::clone(&executor))),
        };
        let service = Arc::new(Systemctl::new(Arc::clone(&executor), config.escalation));
        Self {
            config,
            platform,
            log,
            dry_run,
            executor,
            fs_ops,
            service,
            prompt: Arc::new(InquirePrompt),
        }
    }

    /// Replace the filesystem implementation.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Replace the service manager.
    #[must_use]
    pub fn with_service(mut self, service: Arc<dyn ServiceManager>) -> Self {
        self.service = service;
        self
    }

    /// Replace the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn CredentialPrompt>) -> Self {
        self.prompt = prompt;
        self
    }
}
