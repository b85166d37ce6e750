use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::usecases::ports::PathTranslator;
use crate::usecases::ports::TranslateError;

/// Runs `<program> <args_prefix..> <path>` and takes trimmed stdout as the
/// translated path.
#[derive(Debug, Clone)]
pub struct CommandPathTranslator {
    program: String,
    args_prefix: Vec<String>,
}

impl CommandPathTranslator {
    pub fn new(program: impl Into<String>, args_prefix: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args_prefix,
        }
    }

    /// `<helper> wslpath -u <path>`, normally with helper `wsl`.
    pub fn wslpath(helper: impl Into<String>) -> Self {
        Self::new(helper, vec!["wslpath".to_string(), "-u".to_string()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl PathTranslator for CommandPathTranslator {
    async fn translate(&self, path: &str) -> Result<String, TranslateError> {
        let output = Command::new(&self.program)
            .args(&self.args_prefix)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TranslateError::new(format!("failed to run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("'{}' failed with {}", self.program, output.status)
            } else {
                format!("'{}' failed: {}", self.program, stderr)
            };
            return Err(TranslateError::new(message));
        }

        let translated = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if translated.is_empty() {
            return Err(TranslateError::new(format!(
                "'{}' printed no path for {}",
                self.program, path
            )));
        }
        debug!(from = %path, to = %translated, "Translated path");
        Ok(translated)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdout_is_trimmed() {
        let translator = CommandPathTranslator::new("echo", vec!["/mnt/c".to_string()]);
        let translated = translator.translate("app/a.tsx").await.unwrap();
        assert_eq!(translated, "/mnt/c app/a.tsx");
    }

    #[tokio::test]
    async fn test_failing_helper() {
        let translator = CommandPathTranslator::new(
            "sh",
            vec!["-c".to_string(), "echo 'bad path' >&2; exit 1".to_string()],
        );
        let err = translator.translate("C:/a.tsx").await.unwrap_err();
        assert_eq!(err.message, "'sh' failed: bad path");
    }

    #[tokio::test]
    async fn test_empty_output_is_an_error() {
        let translator = CommandPathTranslator::new("true", Vec::new());
        let err = translator.translate("C:/a.tsx").await.unwrap_err();
        assert!(err.message.contains("printed no path"));
    }

    #[tokio::test]
    async fn test_missing_helper() {
        let translator = CommandPathTranslator::wslpath("pinpoint-no-such-helper");
        let err = translator.translate("C:/a.tsx").await.unwrap_err();
        assert!(err.message.starts_with("failed to run 'pinpoint-no-such-helper'"));
    }
}
