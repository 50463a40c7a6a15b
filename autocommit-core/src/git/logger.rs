// autocommit-core/src/git/logger.rs

//! Audit trail for git invocations: one line per call, plus an error
//! excerpt when the call failed.

use crate::utils::{display_command, truncate_string};
use std::time::Instant;
use tracing::{info, warn};

const ERROR_EXCERPT_CHARS: usize = 500;

/// One finished invocation, as seen by the logger.
#[derive(Debug, Clone)]
pub struct ExecutionRecord<'a> {
    pub command: &'a str,
    pub args: &'a [String],
    pub started: Instant,
    pub finished: Instant,
    pub success: bool,
    pub output: Option<&'a str>,
    pub error: Option<&'a str>,
    /// Why the call was not executed, if it was not.
    pub note: Option<&'a str>,
}

impl ExecutionRecord<'_> {
    pub fn duration_ms(&self) -> u128 {
        self.finished.saturating_duration_since(self.started).as_millis()
    }

    /// Renders the audit lines: `✓ git ...` or `✗ git ...` plus an error line.
    pub fn lines(&self) -> Vec<String> {
        let invocation = display_command(self.command, self.args);
        if self.success {
            return match self.note {
                Some(note) => vec![format!("✓ {} ({}ms) [{}]", invocation, self.duration_ms(), note)],
                None => vec![format!("✓ {} ({}ms)", invocation, self.duration_ms())],
            };
        }

        let mut lines = vec![format!("✗ {} ({}ms)", invocation, self.duration_ms())];
        let excerpt = [self.error, self.output]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("no error output");
        lines.push(format!("  Error: {}", truncate_string(excerpt, ERROR_EXCERPT_CHARS)));
        lines
    }
}

/// Receives every invocation. Implementations must not fail or panic.
pub trait ExecutionLogger: Send + Sync {
    fn log(&self, record: &ExecutionRecord<'_>);
}

/// Writes audit lines through `tracing`: successes at INFO, failures at WARN.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingExecutionLogger;

impl ExecutionLogger for TracingExecutionLogger {
    fn log(&self, record: &ExecutionRecord<'_>) {
        let duration_ms = record.duration_ms() as u64;
        for line in record.lines() {
            if record.success {
                info!(target: "autocommit::git", duration_ms, "{}", line);
            } else {
                warn!(target: "autocommit::git", duration_ms, "{}", line);
            }
        }
    }
}
