// autocommit-core/src/git/executor.rs

//! Runs git as a subprocess with a hard timeout.

use crate::errors::ExecutorError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of one subprocess run. A nonzero exit is still an
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Subprocess wall-clock time only.
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    /// Best single excerpt for an error line: stderr, else stdout.
    pub fn error_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }
}

/// Seam between the tool boundary and the operating system. Tests swap in
/// recording implementations.
#[async_trait]
pub trait GitExecutor: Send + Sync {
    /// Runs the program with `argv` (`[command, args...]`) in `working_dir`.
    async fn execute(
        &self,
        argv: &[String],
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<ExecutionOutcome, ExecutorError>;
}

/// Spawns the real program (normally `git`).
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new("git")
    }
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl GitExecutor for ProcessExecutor {
    async fn execute(
        &self,
        argv: &[String],
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let full_command = format!("{} {}", self.program, argv.join(" "));
        debug!(command = %full_command, working_dir = ?working_dir, "Spawning process");

        let started = Instant::now();
        let child = Command::new(&self.program)
            .current_dir(working_dir)
            .args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                warn!(program = %self.program, error = %source, "Failed to spawn process");
                ExecutorError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ExecutorError::Spawn {
                    program: self.program.clone(),
                    source,
                });
            }
            Err(_) => {
                warn!(command = %full_command, timeout_ms = timeout.as_millis() as u64, "Process timed out and was killed");
                return Err(ExecutorError::Timeout {
                    command: full_command,
                    timeout,
                });
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            command = %full_command,
            exit_code,
            duration_ms,
            "Process finished. Stdout preview: {}",
            stdout.lines().take(3).collect::<Vec<_>>().join(" | ")
        );

        Ok(ExecutionOutcome {
            success: output.status.success(),
            stdout,
            stderr,
            exit_code,
            duration_ms,
        })
    }
}
