// autocommit-core/src/git/mod.rs

//! The git command layer used by the agent.
//!
//! Requests flow through [`runner::GitCommandRunner`], which applies the
//! safety policy and syntax fixes before anything reaches the
//! [`executor::GitExecutor`]. The convenience operations in [`operations`]
//! are built from the same steps.

pub mod executor;
pub mod logger;
pub mod normalize;
pub mod operations;
pub mod result;
pub mod runner;
pub mod safety;
pub mod staging;
pub mod validator;

#[cfg(test)]
mod runner_tests;
#[cfg(test)]
pub(crate) mod test_support;

use serde::Deserialize;

pub use executor::{ExecutionOutcome, GitExecutor, ProcessExecutor};
pub use result::{ErrorCode, ToolData, ToolError, ToolResult};
pub use runner::GitCommandRunner;
pub use safety::{Classification, SafetyPolicy};
pub use validator::{validate_commit_message, ValidationResult};

/// One git invocation requested by the agent.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// The git subcommand, e.g. `status` or `commit`.
    pub command: String,
    /// Arguments after the subcommand, order preserved.
    pub args: Vec<String>,
    #[serde(default)]
    pub allow_dangerous: bool,
    /// Full commit message; only used when `command` is `commit`.
    #[serde(default)]
    pub commit_message: Option<String>,
}

impl CommandRequest {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn allow_dangerous(mut self, allow: bool) -> Self {
        self.allow_dangerous = allow;
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }
}
