//! Subprocess execution with caller-supplied timeouts.
//!
//! External commands are fire-and-forget collaborators: the core captures
//! their output and exit status but never tracks or cancels them beyond the
//! timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Captured result of one external command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run an external command, capturing output, with a timeout in seconds.
pub async fn run_command(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout_secs: u64,
) -> Result<ExecOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Running: {} {}", program, args.join(" "));

    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| {
            Error::Exec(format!(
                "'{}' exceeded timeout of {}s",
                program, timeout_secs
            ))
        })?
        .map_err(|e| Error::Exec(format!("failed to run '{}': {}", program, e)))?;

    Ok(ExecOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Run a command and fail with its stderr if it exits non-zero.
pub async fn run_checked(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout_secs: u64,
) -> Result<ExecOutput> {
    let output = run_command(program, args, cwd, timeout_secs).await?;
    if !output.success() {
        return Err(Error::Exec(format!(
            "'{}' failed (exit {:?}): {}",
            program,
            output.exit_code,
            output.stderr.trim()
        )));
    }
    Ok(output)
}
