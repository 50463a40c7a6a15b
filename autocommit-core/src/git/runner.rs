// autocommit-core/src/git/runner.rs

//! The agent-facing git boundary.
//!
//! [`GitCommandRunner::run`] takes a [`CommandRequest`] through the full
//! pipeline: repository precondition, syntax normalization, commit message
//! staging, safety classification, execution, audit logging. Whatever
//! happens, it returns exactly one [`ToolResult`].

use super::executor::{ExecutionOutcome, GitExecutor};
use super::logger::{ExecutionLogger, ExecutionRecord, TracingExecutionLogger};
use super::normalize::SyntaxNormalizer;
use super::result::{ErrorCode, ToolData, ToolError, ToolResult};
use super::safety::{Classification, SafetyPolicy};
use super::staging::CommitMessageFile;
use super::CommandRequest;
use crate::errors::ExecutorError;
use crate::utils::display_command;
use anyhow::Context;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Subcommands that never change the repository. In dry-run mode anything
/// else is skipped.
pub const READ_ONLY_COMMANDS: &[&str] = &[
    "status",
    "diff",
    "log",
    "show",
    "rev-parse",
    "symbolic-ref",
    "ls-files",
    "ls-tree",
    "cat-file",
    "blame",
    "shortlog",
    "describe",
    "grep",
    "show-ref",
    "merge-base",
    "rev-list",
    "name-rev",
];

const BRANCH_LISTING_FLAGS: &[&str] = &[
    "--list",
    "-l",
    "-a",
    "--all",
    "-r",
    "--remotes",
    "-v",
    "-vv",
    "--verbose",
    "--show-current",
];

/// Whether `git <command> <args>` only reads. `branch` and `tag` count as
/// read-only when listing; `stash` for `list` and `show`.
pub fn is_read_only(command: &str, args: &[String]) -> bool {
    match command {
        "branch" => args.iter().all(|a| BRANCH_LISTING_FLAGS.contains(&a.as_str())),
        "tag" => args.iter().all(|a| a == "-l" || a == "--list"),
        "stash" => matches!(args.first().map(String::as_str), Some("list" | "show")),
        _ => READ_ONLY_COMMANDS.contains(&command),
    }
}

/// A single executed (or dry-run skipped) git call.
#[derive(Debug, Clone)]
pub(crate) struct StepOutput {
    pub command: String,
    pub outcome: ExecutionOutcome,
    pub warnings: Vec<String>,
}

impl StepOutput {
    pub fn into_data(self) -> ToolData {
        ToolData {
            command: self.command,
            stdout: self.outcome.stdout,
            stderr: self.outcome.stderr,
            exit_code: self.outcome.exit_code,
            execution_time: self.outcome.duration_ms,
            warnings: self.warnings,
            details: None,
        }
    }
}

pub struct GitCommandRunner {
    executor: Arc<dyn GitExecutor>,
    logger: Arc<dyn ExecutionLogger>,
    policy: SafetyPolicy,
    normalizer: SyntaxNormalizer,
    timeout: Duration,
    dry_run: bool,
}

impl GitCommandRunner {
    pub fn new(executor: Arc<dyn GitExecutor>) -> Self {
        Self {
            executor,
            logger: Arc::new(TracingExecutionLogger),
            policy: SafetyPolicy::default(),
            normalizer: SyntaxNormalizer::default(),
            timeout: DEFAULT_TIMEOUT,
            dry_run: false,
        }
    }

    pub fn with_policy(mut self, policy: SafetyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_normalizer(mut self, normalizer: SyntaxNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Executes an arbitrary git subcommand on behalf of the agent.
    pub async fn run(&self, request: &CommandRequest, working_dir: &Path) -> ToolResult {
        let invocation = display_command(&request.command, &request.args);
        info!(command = %invocation, allow_dangerous = request.allow_dangerous, "Git tool invoked");

        if let Err(failure) = ensure_repository(working_dir, &invocation) {
            return ToolResult::failure(failure);
        }

        match self.execute_request(request, working_dir).await {
            Ok(Ok(step)) => ToolResult::success(step.into_data()),
            Ok(Err(failure)) => ToolResult::failure(failure),
            Err(e) => {
                error!(command = %invocation, error = ?e, "Unexpected failure in git tool");
                ToolResult::failure(ToolError::unknown(invocation, &e))
            }
        }
    }

    /// Everything after the precondition check. The outer `Err` is reserved
    /// for internal failures (such as the message file not being writable).
    pub(crate) async fn execute_request(
        &self,
        request: &CommandRequest,
        working_dir: &Path,
    ) -> anyhow::Result<Result<StepOutput, ToolError>> {
        let mut args = self.normalizer.normalize(&request.args);

        // Held until the end of this function; dropping it deletes the file.
        let message_file = match request.commit_message.as_deref() {
            Some(message) if request.command == "commit" && !message.is_empty() => {
                let file = CommitMessageFile::create(working_dir, message)
                    .context("Failed to write commit message file")?;
                args = file.rewrite_args(&args);
                Some(file)
            }
            _ => None,
        };

        let step = self
            .step(&request.command, &args, request.allow_dangerous, working_dir)
            .await;

        drop(message_file);
        Ok(step)
    }

    /// Normalizes user-supplied arguments.
    pub(crate) fn normalize(&self, args: &[String]) -> Vec<String> {
        self.normalizer.normalize(args)
    }

    /// Classifies, executes and logs one git call. A blocked command never
    /// reaches the executor.
    pub(crate) async fn step(
        &self,
        command: &str,
        args: &[String],
        allow_dangerous: bool,
        working_dir: &Path,
    ) -> Result<StepOutput, ToolError> {
        let invocation = display_command(command, args);
        let mut warnings = Vec::new();

        match self.policy.classify(command, args, allow_dangerous) {
            Classification::Blocked { pattern } => {
                self.log_unexecuted(command, args, false, &format!("blocked by pattern '{}'", pattern));
                return Err(ToolError::dangerous(invocation, &pattern));
            }
            Classification::Caution { warning } => warnings.push(warning),
            Classification::Clear => {}
        }

        if self.dry_run && !is_read_only(command, args) {
            debug!(command = %invocation, "Dry run: skipping git command that may modify the repository");
            self.log_unexecuted(command, args, true, "skipped (dry run)");
            warnings.push(format!("Dry run: '{}' was not executed", invocation));
            return Ok(StepOutput {
                command: invocation,
                outcome: ExecutionOutcome {
                    success: true,
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: 0,
                    duration_ms: 0,
                },
                warnings,
            });
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(command.to_string());
        argv.extend_from_slice(args);

        let started = Instant::now();
        let executed = self.executor.execute(&argv, working_dir, self.timeout).await;
        let finished = Instant::now();

        match executed {
            Ok(outcome) => {
                self.logger.log(&ExecutionRecord {
                    command,
                    args,
                    started,
                    finished,
                    success: outcome.success,
                    output: Some(&outcome.stdout),
                    error: Some(&outcome.stderr),
                    note: None,
                });
                if outcome.success {
                    Ok(StepOutput {
                        command: invocation,
                        outcome,
                        warnings,
                    })
                } else {
                    Err(command_failed(invocation, &outcome))
                }
            }
            Err(executor_error) => {
                let message = executor_error.to_string();
                self.logger.log(&ExecutionRecord {
                    command,
                    args,
                    started,
                    finished,
                    success: false,
                    output: None,
                    error: Some(&message),
                    note: None,
                });
                Err(executor_failure(invocation, executor_error))
            }
        }
    }

    /// Audit record for a call that never reached the executor.
    fn log_unexecuted(&self, command: &str, args: &[String], success: bool, reason: &str) {
        let now = Instant::now();
        self.logger.log(&ExecutionRecord {
            command,
            args,
            started: now,
            finished: now,
            success,
            output: None,
            error: (!success).then_some(reason),
            note: Some(reason),
        });
    }
}

/// Fails with `NOT_GIT_REPO` unless `working_dir` is inside a non-bare
/// repository.
pub(crate) fn ensure_repository(working_dir: &Path, invocation: &str) -> Result<(), ToolError> {
    match git2::Repository::discover(working_dir) {
        Ok(repo) if !repo.is_bare() => Ok(()),
        Ok(_) => Err(ToolError::not_git_repo(
            invocation,
            format!("{} is inside a bare repository", working_dir.display()),
        )),
        Err(e) => {
            debug!(working_dir = ?working_dir, error = %e, "Repository discovery failed");
            Err(ToolError::not_git_repo(invocation, e.message().to_string()))
        }
    }
}

fn command_failed(invocation: String, outcome: &ExecutionOutcome) -> ToolError {
    ToolError::new(
        ErrorCode::GitCommandFailed,
        format!("'{}' exited with code {}", invocation, outcome.exit_code),
        invocation,
    )
    .with_details(json!({
        "exitCode": outcome.exit_code,
        "stdout": outcome.stdout,
        "stderr": outcome.stderr,
        "executionTime": outcome.duration_ms,
    }))
    .with_suggestion("Check the command syntax and the current repository state")
}

fn executor_failure(invocation: String, err: ExecutorError) -> ToolError {
    match err {
        ExecutorError::Timeout { timeout, .. } => ToolError::new(
            ErrorCode::GitCommandFailed,
            format!("'{}' timed out after {}ms", invocation, timeout.as_millis()),
            invocation,
        )
        .with_details(json!({ "timeoutMs": timeout.as_millis() as u64 }))
        .with_suggestion("Narrow the command or make sure git is not waiting for input"),
        ExecutorError::Spawn { program, source } => ToolError::new(
            ErrorCode::UnknownError,
            format!("Failed to start '{}': {}", program, source),
            invocation,
        )
        .with_details(json!({ "program": program }))
        .with_suggestion("Make sure git is installed and on PATH"),
    }
}
