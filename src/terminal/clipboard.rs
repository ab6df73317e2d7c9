//! System clipboard access through the platform's copy utility.

use std::{future::Future, io::ErrorKind, process::Stdio};
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::debug;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("No clipboard utility found")]
    Unavailable,
    #[error("Clipboard copy failed: {0}")]
    Failed(String),
}

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>> + Send;
}

/// An external program that reads the text to copy from stdin.
#[derive(Clone, Debug)]
pub struct CopyProgram {
    pub program: String,
    pub args: Vec<String>,
}

impl CopyProgram {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Tries each known copy utility in turn until one succeeds.
#[derive(Clone, Debug)]
pub struct SystemClipboard {
    programs: Vec<CopyProgram>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::with_programs(vec![
            CopyProgram::new("wl-copy", &[]),
            CopyProgram::new("xclip", &["-selection", "clipboard"]),
            CopyProgram::new("pbcopy", &[]),
        ])
    }
}

impl SystemClipboard {
    #[must_use]
    pub fn with_programs(programs: Vec<CopyProgram>) -> Self {
        Self { programs }
    }

    async fn run(program: &CopyProgram, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&program.program)
            .args(&program.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => ClipboardError::Unavailable,
                _ => ClipboardError::Failed(format!("{}: {err}", program.program)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|err| ClipboardError::Failed(format!("{}: {err}", program.program)))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|err| ClipboardError::Failed(format!("{}: {err}", program.program)))?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Failed(format!(
                "{} exited with {status}",
                program.program
            )))
        }
    }
}

impl Clipboard for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last = ClipboardError::Unavailable;
        for program in &self.programs {
            match Self::run(program, text).await {
                Ok(()) => {
                    debug!(program = %program.program, "copied to clipboard");
                    return Ok(());
                }
                Err(ClipboardError::Unavailable) => {}
                Err(err) => {
                    debug!(program = %program.program, "clipboard program failed: {err}");
                    last = err;
                }
            }
        }
        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_programs_are_unavailable() {
        let clipboard = SystemClipboard::with_programs(vec![CopyProgram::new(
            "burnlink-no-such-clipboard",
            &[],
        )]);
        assert_eq!(clipboard.copy("x").await, Err(ClipboardError::Unavailable));
    }

    #[tokio::test]
    async fn first_working_program_wins() {
        if std::process::Command::new("cat").arg("--version").output().is_err() {
            eprintln!("Skipping test: cat not available");
            return;
        }
        let clipboard = SystemClipboard::with_programs(vec![
            CopyProgram::new("burnlink-no-such-clipboard", &[]),
            CopyProgram::new("cat", &[]),
        ]);
        assert_eq!(clipboard.copy("meet at dawn").await, Ok(()));
    }

    #[tokio::test]
    async fn failing_program_reports_failure() {
        if std::process::Command::new("sh").arg("-c").arg("true").output().is_err() {
            eprintln!("Skipping test: sh not available");
            return;
        }
        let clipboard =
            SystemClipboard::with_programs(vec![CopyProgram::new("sh", &["-c", "cat >/dev/null; exit 3"])]);
        assert!(matches!(
            clipboard.copy("x").await,
            Err(ClipboardError::Failed(_))
        ));
    }
}
