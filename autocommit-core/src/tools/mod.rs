// autocommit-core/src/tools/mod.rs

//! The git tools offered to the model.
//!
//! Arguments arrive as loose JSON. Each tool deserializes them into a typed
//! request; anything that does not fit comes back as an `INVALID_INPUT`
//! result rather than an error, so the model can correct itself.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{AppConfig, CommitConfig};
use crate::git::operations::{AddOptions, CommitOptions, DiffOptions};
use crate::git::{
    validate_commit_message, CommandRequest, ErrorCode, GitCommandRunner, ProcessExecutor, SafetyPolicy,
    ToolError, ToolResult,
};
use crate::utils::display_command;
use crate::models::tools::{ToolDefinition, ToolInput, ToolParameter, ToolParametersDefinition};
use crate::ToolProvider;

pub const GIT_COMMAND: &str = "git_command";
pub const GIT_STATUS: &str = "git_status";
pub const GIT_DIFF: &str = "git_diff";
pub const GIT_ADD: &str = "git_add";
pub const GIT_COMMIT: &str = "git_commit";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CommitArgs {
    message: String,
}

#[derive(Debug)]
enum GitToolArguments {
    Command(CommandRequest),
    Status,
    Diff(DiffOptions),
    Add(AddOptions),
    Commit(CommitArgs),
}

impl fmt::Display for GitToolArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitToolArguments::Command(request) => {
                write!(f, "command: {}, args: {:?}", request.command, request.args)?;
                if request.allow_dangerous {
                    write!(f, ", allowDangerous")?;
                }
                if request.commit_message.is_some() {
                    write!(f, ", with commitMessage")?;
                }
                Ok(())
            }
            GitToolArguments::Status => write!(f, "status"),
            GitToolArguments::Diff(options) => {
                write!(f, "staged: {}, paths: {:?}", options.staged, options.paths)
            }
            GitToolArguments::Add(options) => write!(
                f,
                "paths: {:?}, all: {}, update: {}",
                options.paths, options.all, options.update
            ),
            GitToolArguments::Commit(args) => write!(f, "message_len: {}", args.message.len()),
        }
    }
}

fn from_arguments<T: DeserializeOwned>(arguments: &HashMap<String, JsonValue>) -> Result<T, String> {
    let object: Map<String, JsonValue> = arguments
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_json::from_value(JsonValue::Object(object)).map_err(|e| e.to_string())
}

/// `Ok(Err(message))` is a schema violation; `Err` is an unknown tool.
fn parse_tool_arguments(
    tool_name: &str,
    arguments: &HashMap<String, JsonValue>,
) -> Result<Result<GitToolArguments, String>> {
    let parsed = match tool_name {
        GIT_COMMAND => from_arguments::<CommandRequest>(arguments).and_then(|request| {
            if request.command.trim().is_empty() {
                Err("'command' must be a non-empty string".to_string())
            } else {
                Ok(GitToolArguments::Command(request))
            }
        }),
        GIT_STATUS => Ok(GitToolArguments::Status),
        GIT_DIFF => from_arguments(arguments).map(GitToolArguments::Diff),
        GIT_ADD => from_arguments(arguments).map(GitToolArguments::Add),
        GIT_COMMIT => from_arguments(arguments).map(GitToolArguments::Commit),
        unknown => return Err(anyhow!("Unknown tool name: {}", unknown)),
    };
    Ok(parsed)
}

/// Serves the git tools through one [`GitCommandRunner`].
pub struct GitToolProvider {
    runner: GitCommandRunner,
    commit: CommitConfig,
}

impl GitToolProvider {
    pub fn new(runner: GitCommandRunner, commit: CommitConfig) -> Self {
        Self { runner, commit }
    }

    /// Real git, with the timeout, push permission and dry-run mode taken
    /// from the configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let runner = GitCommandRunner::new(Arc::new(ProcessExecutor::new(config.git.program.clone())))
            .with_timeout(config.git.timeout())
            .with_policy(SafetyPolicy::for_push_permission(config.commit.allow_push))
            .with_dry_run(config.commit.dry_run);
        Self::new(runner, config.commit.clone())
    }

    pub fn runner(&self) -> &GitCommandRunner {
        &self.runner
    }

    /// Holds a raw `commit` request to the settings `git_commit` applies:
    /// strict format checking of `commitMessage` and `--no-verify` when
    /// hooks are skipped.
    fn apply_commit_settings(&self, request: &mut CommandRequest) -> Result<(), ToolError> {
        if self.commit.strict {
            if let Some(message) = request.commit_message.as_deref().filter(|m| !m.is_empty()) {
                let validation = validate_commit_message(message);
                if !validation.valid {
                    return Err(ToolError::new(
                        ErrorCode::InvalidCommitMessage,
                        "Commit message does not follow the conventional commit format",
                        display_command("commit", &request.args),
                    )
                    .with_details(json!({ "errors": validation.errors }))
                    .with_suggestion(validation.errors.join("; ")));
                }
            }
        }
        if self.commit.skip_hooks && !request.args.iter().any(|a| a == "--no-verify" || a == "-n") {
            request.args.push("--no-verify".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl ToolProvider for GitToolProvider {
    fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: GIT_COMMAND.to_string(),
                description: "Run any git subcommand. Destructive patterns (reset --hard, push --force, clean -f, ...) are blocked unless allowDangerous is true. Use commitMessage for multi-line commit messages instead of -m. Commits follow the same format and hook settings as git_commit.".to_string(),
                parameters: ToolParametersDefinition::object(
                    vec![
                        ("command", ToolParameter::string("The git subcommand, e.g. 'status', 'log', 'commit'")),
                        ("args", ToolParameter::string_array("Arguments after the subcommand, in order. May be empty.")),
                        ("allowDangerous", ToolParameter::boolean("Run even if the command matches a dangerous pattern. Defaults to false.")),
                        ("commitMessage", ToolParameter::string("Full commit message; only used when command is 'commit'.")),
                    ],
                    &["command", "args"],
                ),
            },
            ToolDefinition {
                name: GIT_STATUS.to_string(),
                description: "Show the current branch and the changed files (porcelain status).".to_string(),
                parameters: ToolParametersDefinition::object(vec![], &[]),
            },
            ToolDefinition {
                name: GIT_DIFF.to_string(),
                description: "Show the diff of the working tree, or of the index when staged is true.".to_string(),
                parameters: ToolParametersDefinition::object(
                    vec![
                        ("staged", ToolParameter::boolean("Diff staged changes instead of unstaged ones. Defaults to false.")),
                        ("paths", ToolParameter::string_array("Limit the diff to these paths.")),
                        ("contextLines", ToolParameter::integer("Lines of context around each change.")),
                        ("stat", ToolParameter::boolean("Only show a diffstat summary. Defaults to false.")),
                    ],
                    &[],
                ),
            },
            ToolDefinition {
                name: GIT_ADD.to_string(),
                description: "Stage files. Give explicit paths (which must exist), or set all (-A) or update (-u).".to_string(),
                parameters: ToolParametersDefinition::object(
                    vec![
                        ("paths", ToolParameter::string_array("Paths to stage, relative to the repository working directory.")),
                        ("all", ToolParameter::boolean("Stage all changes including untracked files.")),
                        ("update", ToolParameter::boolean("Stage modifications and deletions of tracked files only.")),
                    ],
                    &[],
                ),
            },
            ToolDefinition {
                name: GIT_COMMIT.to_string(),
                description: "Commit the staged changes with a conventional commit message. Fails if nothing is staged.".to_string(),
                parameters: ToolParametersDefinition::object(
                    vec![(
                        "message",
                        ToolParameter::string("The full commit message: '<type>(<scope>): <description>', optionally followed by a blank line and a body."),
                    )],
                    &["message"],
                ),
            },
        ]
    }

    async fn execute_tool(&self, tool_name: &str, input: ToolInput, working_dir: &Path) -> Result<String> {
        let parsed = match parse_tool_arguments(tool_name, &input.arguments)? {
            Ok(parsed) => parsed,
            Err(message) => {
                debug!(tool_name = tool_name, error = %message, "Rejected tool arguments");
                let failure = ToolError::new(
                    ErrorCode::InvalidInput,
                    format!("Invalid arguments for '{}': {}", tool_name, message),
                    tool_name,
                )
                .with_suggestion("Check the tool schema and retry with corrected arguments");
                return Ok(ToolResult::failure(failure).to_json_string());
            }
        };

        info!(tool_name = tool_name, args = %parsed, "Executing git tool");

        let result = match parsed {
            GitToolArguments::Command(mut request) => {
                if request.command == "commit" {
                    if let Err(failure) = self.apply_commit_settings(&mut request) {
                        return Ok(ToolResult::failure(failure).to_json_string());
                    }
                }
                self.runner.run(&request, working_dir).await
            }
            GitToolArguments::Status => self.runner.status(working_dir).await,
            GitToolArguments::Diff(options) => self.runner.diff(&options, working_dir).await,
            GitToolArguments::Add(options) => self.runner.add(&options, working_dir).await,
            GitToolArguments::Commit(args) => {
                let options = CommitOptions {
                    message: args.message,
                    validate: self.commit.strict,
                    no_verify: self.commit.skip_hooks,
                };
                self.runner.commit(&options, working_dir).await
            }
        };
        Ok(result.to_json_string())
    }
}
