//! Service manager control behind the [`ServiceManager`] trait.
use anyhow::Result;
use std::sync::Arc;

use crate::config::Escalation;
use crate::exec::Executor;

/// The subset of `systemctl` that reconciliation needs.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceManager: Send + Sync {
    /// Re-read unit files from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the service manager rejects the reload.
    fn daemon_reload(&self) -> Result<()>;

    /// Enable and start every unit in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if any unit fails to enable or start.
    fn enable_now(&self, units: &[String]) -> Result<()>;

    /// Disable a unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit cannot be disabled.
    fn disable(&self, unit: &str) -> Result<()>;

    /// Stop a unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit cannot be stopped.
    fn stop(&self, unit: &str) -> Result<()>;
}

/// [`ServiceManager`] that shells out to `systemctl`.
#[derive(Debug)]
pub struct Systemctl {
    executor: Arc<dyn Executor>,
    escalation: Escalation,
}

impl Systemctl {
    /// Drive `systemctl` through `executor`, prefixed with `sudo` when
    /// `escalation` asks for it.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, escalation: Escalation) -> Self {
        Self {
            executor,
            escalation,
        }
    }

    fn systemctl(&self, args: &[&str]) -> Result<()> {
        match self.escalation {
            Escalation::None => self.executor.run("systemctl", args)?,
            Escalation::Sudo => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push("systemctl");
                full.extend_from_slice(args);
                self.executor.run("sudo", &full)?
            }
        };
        Ok(())
    }
}

impl ServiceManager for Systemctl {
    fn daemon_reload(&self) -> Result<()> {
        self.systemctl(&["daemon-reload"])
    }

    fn enable_now(&self, units: &[String]) -> Result<()> {
        let mut args = vec!["enable", "--now"];
        args.extend(units.iter().map(String::as_str));
        self.systemctl(&args)
    }

    fn disable(&self, unit: &str) -> Result<()> {
        self.systemctl(&["disable", unit])
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.systemctl(&["stop", unit])
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::ExecResult;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Executor for RecordingExecutor {
        fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
            let result = self.run_unchecked(program, args)?;
            if !result.success {
                anyhow::bail!("{program} failed");
            }
            Ok(result)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{program} {}", args.join(" ")));
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                success: !self.fail,
                code: Some(i32::from(self.fail)),
            })
        }

        fn which(&self, _: &str) -> bool {
            true
        }
    }

    #[test]
    fn commands_without_escalation() {
        let exec = Arc::new(RecordingExecutor::default());
        let sm = Systemctl::new(exec.clone(), Escalation::None);
        sm.daemon_reload().unwrap();
        sm.enable_now(&["mnt-a.automount".to_string(), "mnt-b.swap".to_string()])
            .unwrap();
        sm.disable("mnt-a.automount").unwrap();
        sm.stop("mnt-a.automount").unwrap();
        assert_eq!(
            *exec.calls.lock().unwrap(),
            vec![
                "systemctl daemon-reload",
                "systemctl enable --now mnt-a.automount mnt-b.swap",
                "systemctl disable mnt-a.automount",
                "systemctl stop mnt-a.automount",
            ]
        );
    }

    #[test]
    fn sudo_escalation_prefixes_commands() {
        let exec = Arc::new(RecordingExecutor::default());
        let sm = Systemctl::new(exec.clone(), Escalation::Sudo);
        sm.daemon_reload().unwrap();
        assert_eq!(*exec.calls.lock().unwrap(), vec!["sudo systemctl daemon-reload"]);
    }

    #[test]
    fn failures_propagate() {
        let exec = Arc::new(RecordingExecutor {
            fail: true,
            ..RecordingExecutor::default()
        });
        let sm = Systemctl::new(exec, Escalation::None);
        assert!(sm.enable_now(&["mnt-a.automount".to_string()]).is_err());
    }
}
