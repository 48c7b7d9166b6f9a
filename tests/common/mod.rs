// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed host (template directory, unit
// directory, credentials file, lock file, fake devices) plus recording
// doubles for the service manager and the prompt, so each test can drive a
// full reconciliation without touching the real system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mounts_cli::config::{Config, Escalation};
use mounts_cli::credentials::CredentialPrompt;
use mounts_cli::exec::SystemExecutor;
use mounts_cli::logging::{Log, Logger};
use mounts_cli::platform::{OsVariant, Platform};
use mounts_cli::service::ServiceManager;
use mounts_cli::tasks::Context;

/// Service manager that records every call as a `systemctl`-style string.
#[derive(Debug, Default)]
pub struct RecordingServiceManager {
    calls: Mutex<Vec<String>>,
    fail_enable: bool,
    fail_reload: bool,
}

impl RecordingServiceManager {
    /// A manager whose batch enable always fails.
    pub fn failing_enable() -> Self {
        Self {
            fail_enable: true,
            ..Self::default()
        }
    }

    /// A manager whose `daemon-reload` always fails.
    pub fn failing_reload() -> Self {
        Self {
            fail_reload: true,
            ..Self::default()
        }
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls poisoned").push(call);
    }
}

impl ServiceManager for RecordingServiceManager {
    fn daemon_reload(&self) -> anyhow::Result<()> {
        self.record("daemon-reload".to_string());
        if self.fail_reload {
            anyhow::bail!("failed to reload daemon: access denied");
        }
        Ok(())
    }

    fn enable_now(&self, units: &[String]) -> anyhow::Result<()> {
        self.record(format!("enable --now {}", units.join(" ")));
        if self.fail_enable {
            anyhow::bail!("job for {} failed", units.join(" "));
        }
        Ok(())
    }

    fn disable(&self, unit: &str) -> anyhow::Result<()> {
        self.record(format!("disable {unit}"));
        Ok(())
    }

    fn stop(&self, unit: &str) -> anyhow::Result<()> {
        self.record(format!("stop {unit}"));
        Ok(())
    }
}

/// Prompt with canned answers that counts how often it was asked.
#[derive(Debug)]
pub struct ScriptedPrompt {
    username: String,
    password: String,
    confirm: bool,
    asked: Mutex<Vec<&'static str>>,
}

impl ScriptedPrompt {
    /// Answer every credential prompt with `username` / `password`.
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            confirm: true,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Which prompts were shown, in order.
    pub fn asked(&self) -> Vec<&'static str> {
        self.asked.lock().expect("asked poisoned").clone()
    }

    fn ask(&self, which: &'static str) {
        self.asked.lock().expect("asked poisoned").push(which);
    }
}

impl CredentialPrompt for ScriptedPrompt {
    fn username(&self) -> anyhow::Result<String> {
        self.ask("username");
        Ok(self.username.clone())
    }

    fn password(&self) -> anyhow::Result<String> {
        self.ask("password");
        Ok(self.password.clone())
    }

    fn confirm(&self, _message: &str) -> anyhow::Result<bool> {
        self.ask("confirm");
        Ok(self.confirm)
    }
}

/// An isolated host backed by a [`tempfile::TempDir`].
pub struct TestHost {
    /// Temporary root holding every directory below.
    pub root: tempfile::TempDir,
    /// Recorded service-manager calls.
    pub service: Arc<RecordingServiceManager>,
    /// Recorded prompts.
    pub prompt: Arc<ScriptedPrompt>,
    /// Logger inspected for the task summary.
    pub log: Arc<Logger>,
    variant: OsVariant,
}

impl TestHost {
    /// Template directory.
    pub fn source_dir(&self) -> PathBuf {
        self.root.path().join("mounts")
    }

    /// Installed unit directory.
    pub fn unit_dir(&self) -> PathBuf {
        self.root.path().join("systemd")
    }

    /// Credentials file.
    pub fn credentials_path(&self) -> PathBuf {
        self.root.path().join("smb-credentials")
    }

    /// Run lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.root.path().join("mounts.lock")
    }

    /// Path of a fake local device.
    pub fn device(&self, name: &str) -> PathBuf {
        self.root.path().join("dev").join(name)
    }

    /// Sorted file names in the unit directory.
    pub fn installed(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.unit_dir())
            .expect("read unit dir")
            .map(|e| {
                e.expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    /// Content of an installed unit.
    pub fn installed_content(&self, name: &str) -> String {
        std::fs::read_to_string(self.unit_dir().join(name)).expect("read installed unit")
    }

    /// Build a task context wired to this host.
    pub fn context(&self, dry_run: bool) -> Context {
        let config = Config {
            source_dir: self.source_dir(),
            unit_dir: self.unit_dir(),
            credentials_path: self.credentials_path(),
            lock_path: self.lock_path(),
            escalation: Escalation::None,
        };
        Context::new(
            Arc::new(config),
            Arc::new(Platform::new(self.variant, "test host")),
            Arc::clone(&self.log) as Arc<dyn Log>,
            dry_run,
            Arc::new(SystemExecutor),
        )
        .with_service(Arc::clone(&self.service) as Arc<dyn ServiceManager>)
        .with_prompt(Arc::clone(&self.prompt) as Arc<dyn CredentialPrompt>)
    }
}

/// Fluent builder for [`TestHost`].
pub struct TestHostBuilder {
    host: TestHost,
}

impl TestHostBuilder {
    /// Empty source and unit directories on a standard-root host.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        for dir in ["mounts", "systemd", "dev"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create dir");
        }
        Self {
            host: TestHost {
                root,
                service: Arc::new(RecordingServiceManager::default()),
                prompt: Arc::new(ScriptedPrompt::new("alice", "s3cret")),
                log: Arc::new(Logger::new("test")),
                variant: OsVariant::StandardRoot,
            },
        }
    }

    /// Use `variant` for path rules.
    pub fn variant(mut self, variant: OsVariant) -> Self {
        self.host.variant = variant;
        self
    }

    /// Add a template to the source directory.
    pub fn template(self, name: &str, content: &str) -> Self {
        write(&self.host.source_dir().join(name), content);
        self
    }

    /// Add a unit left over from a previous run.
    pub fn installed(self, name: &str, content: &str) -> Self {
        write(&self.host.unit_dir().join(name), content);
        self
    }

    /// Where [`Self::device`] puts a device named `name`.
    pub fn device_path(&self, name: &str) -> PathBuf {
        self.host.device(name)
    }

    /// Create a fake local device file.
    pub fn device(self, name: &str) -> Self {
        write(&self.host.device(name), "");
        self
    }

    /// Replace the service manager.
    pub fn service(mut self, service: RecordingServiceManager) -> Self {
        self.host.service = Arc::new(service);
        self
    }

    /// Finalise the host.
    pub fn build(self) -> TestHost {
        self.host
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
