// autocommit-core/src/errors.rs
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running the agent loop.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Configuration was missing or invalid.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// The chat-completions call failed after retries.
    #[error("API Error: {0}")]
    Api(#[source] anyhow::Error),

    /// The model response could not be used (no choices, bad shape).
    #[error("Response Error: {0}")]
    Response(String),

    /// The model kept requesting tools past the iteration limit.
    #[error("Agent stopped after reaching maximum iterations ({0})")]
    MaxIterations(usize),
}

impl AgentError {
    pub fn config(msg: impl Into<String>) -> Self {
        AgentError::Config(msg.into())
    }
}

/// Failures the subprocess layer cannot express as an exit code.
///
/// A nonzero exit is *not* an error; it comes back as an
/// [`ExecutionOutcome`](crate::git::executor::ExecutionOutcome).
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' timed out after {}ms", timeout.as_millis())]
    Timeout { command: String, timeout: Duration },
}
