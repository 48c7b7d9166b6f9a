//! Network-share credential collection and the shared credentials file.
use anyhow::Result;
use std::path::Path;

use crate::error::ReconcileError;
use crate::logging::Log;
use crate::operations::FileSystemOps;

/// Mode of the credentials file: owner read/write only.
pub const CREDENTIALS_MODE: u32 = 0o600;

/// Interactive source of credentials and confirmations.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialPrompt: Send + Sync {
    /// Ask for the share username.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt is cancelled or cannot be shown.
    fn username(&self) -> Result<String>;

    /// Ask for the share password, masked.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt is cancelled or cannot be shown.
    fn password(&self) -> Result<String>;

    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt is cancelled or cannot be shown.
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// [`CredentialPrompt`] on the terminal via `inquire`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompt;

impl CredentialPrompt for InquirePrompt {
    fn username(&self) -> Result<String> {
        Ok(inquire::Text::new("Network share username:").prompt()?)
    }

    fn password(&self) -> Result<String> {
        Ok(inquire::Password::new("Network share password:")
            .without_confirmation()
            .prompt()?)
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        Ok(inquire::Confirm::new(message).with_default(false).prompt()?)
    }
}

/// Render the credentials file body.
fn render(username: &str, password: &str) -> String {
    format!("user={username}\npassword={password}\n")
}

/// Collect credentials and replace the file at `path`.
///
/// The old file is removed before the new one is written with
/// [`CREDENTIALS_MODE`].
///
/// # Errors
///
/// Returns [`ReconcileError::CredentialCollectionFailed`] if a prompt is
/// cancelled, the username is empty, or the file cannot be replaced.
pub fn provision(
    prompt: &dyn CredentialPrompt,
    fs: &dyn FileSystemOps,
    path: &Path,
    log: &dyn Log,
) -> Result<(), ReconcileError> {
    let failed = |reason: String| ReconcileError::CredentialCollectionFailed { reason };

    let username = prompt
        .username()
        .map_err(|e| failed(format!("username prompt: {e}")))?;
    let username = username.trim();
    if username.is_empty() {
        return Err(failed("empty username".to_string()));
    }
    let password = prompt
        .password()
        .map_err(|e| failed(format!("password prompt: {e}")))?;

    if fs.exists(path) {
        log.debug(&format!("removing old credentials file {}", path.display()));
        fs.remove(path)
            .map_err(|e| failed(format!("removing {}: {e}", path.display())))?;
    }
    fs.write_file(path, &render(username, &password), CREDENTIALS_MODE)
        .map_err(|e| failed(format!("writing {}: {e}", path.display())))?;
    log.info(&format!("credentials written to {}", path.display()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::operations::MockFileSystemOps;
    use std::path::PathBuf;

    const PATH: &str = "/etc/.smb-credentials";

    fn prompt_with(username: &'static str, password: &'static str) -> MockCredentialPrompt {
        let mut prompt = MockCredentialPrompt::new();
        prompt
            .expect_username()
            .returning(move || Ok(username.to_string()));
        prompt
            .expect_password()
            .returning(move || Ok(password.to_string()));
        prompt
    }

    #[test]
    fn writes_two_line_file_with_owner_only_mode() {
        let fs = MockFileSystemOps::new();
        let log = Logger::new("test");
        provision(&prompt_with("alice", "s3cret"), &fs, Path::new(PATH), &log).unwrap();

        let written = fs.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from(PATH));
        assert_eq!(written[0].1, "user=alice\npassword=s3cret\n");
        assert_eq!(written[0].2, 0o600);
    }

    #[test]
    fn existing_file_is_removed_first() {
        let fs = MockFileSystemOps::new().with_existing(PATH);
        let log = Logger::new("test");
        provision(&prompt_with("bob", "pw"), &fs, Path::new(PATH), &log).unwrap();
        assert_eq!(fs.removed(), vec![PathBuf::from(PATH)]);
        assert_eq!(fs.written().len(), 1);
    }

    #[test]
    fn empty_username_fails_without_writing() {
        let mut prompt = MockCredentialPrompt::new();
        prompt.expect_username().returning(|| Ok("  ".to_string()));
        prompt.expect_password().never();
        let fs = MockFileSystemOps::new().with_existing(PATH);
        let log = Logger::new("test");

        let err = provision(&prompt, &fs, Path::new(PATH), &log).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::CredentialCollectionFailed { .. }
        ));
        assert!(fs.written().is_empty());
        assert!(fs.removed().is_empty());
    }

    #[test]
    fn cancelled_password_prompt_fails() {
        let mut prompt = MockCredentialPrompt::new();
        prompt.expect_username().returning(|| Ok("alice".to_string()));
        prompt
            .expect_password()
            .returning(|| Err(anyhow::anyhow!("operation canceled by user")));
        let fs = MockFileSystemOps::new();
        let log = Logger::new("test");

        let err = provision(&prompt, &fs, Path::new(PATH), &log).unwrap_err();
        assert!(err.to_string().contains("operation canceled"));
        assert!(fs.written().is_empty());
    }

    #[test]
    fn failing_removal_aborts() {
        let fs = MockFileSystemOps::new()
            .with_existing(PATH)
            .with_failing_removal(PATH);
        let log = Logger::new("test");
        let err = provision(&prompt_with("a", "b"), &fs, Path::new(PATH), &log).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::CredentialCollectionFailed { .. }
        ));
        assert!(fs.written().is_empty());
    }
}
