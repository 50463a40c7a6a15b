// autocommit-core/src/git/operations.rs

//! Status, diff, add and commit, composed from the same guarded steps as
//! the generic git tool.

use super::result::{ErrorCode, ToolError, ToolResult};
use super::runner::{ensure_repository, GitCommandRunner, StepOutput};
use super::validator::validate_commit_message;
use super::CommandRequest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiffOptions {
    /// Diff the index against HEAD instead of the working tree.
    #[serde(default)]
    pub staged: bool,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub context_lines: Option<u32>,
    #[serde(default)]
    pub stat: bool,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddOptions {
    #[serde(default)]
    pub paths: Vec<String>,
    /// Stage everything, including untracked files (`-A`).
    #[serde(default)]
    pub all: bool,
    /// Stage modifications and deletions of tracked files only (`-u`).
    #[serde(default)]
    pub update: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitOptions {
    pub message: String,
    /// Enforce the conventional commit format before committing.
    pub validate: bool,
    /// Pass `--no-verify` to skip commit hooks.
    pub no_verify: bool,
}

impl CommitOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            validate: true,
            no_verify: false,
        }
    }
}

/// One entry of `git status --porcelain -z`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    /// Index (staged) state letter, `' '` when unchanged.
    pub index: char,
    /// Working tree state letter, `' '` when unchanged.
    pub worktree: char,
}

/// Parses NUL-separated porcelain v1 output. Paths are verbatim (no
/// C-quoting); a rename or copy entry is followed by its source path, which
/// is skipped.
pub fn parse_porcelain_status(stdout: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut records = stdout.split('\0');
    while let Some(record) = records.next() {
        let mut chars = record.chars();
        let (Some(index), Some(worktree), Some(' ')) = (chars.next(), chars.next(), chars.next()) else {
            continue;
        };
        let path = chars.as_str();
        if path.is_empty() {
            continue;
        }
        if matches!(index, 'R' | 'C') {
            records.next();
        }
        entries.push(StatusEntry {
            path: path.to_string(),
            index,
            worktree,
        });
    }
    entries
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

impl GitCommandRunner {
    /// Porcelain status plus the current branch. A failed branch lookup is
    /// only a warning.
    pub async fn status(&self, working_dir: &Path) -> ToolResult {
        let status_args = vec!["--porcelain".to_string(), "-z".to_string()];
        if let Err(failure) = ensure_repository(working_dir, "git status --porcelain -z") {
            return ToolResult::failure(failure);
        }

        let mut warnings = Vec::new();
        let mut partial = BTreeMap::new();

        let status = self.step("status", &status_args, false, working_dir).await;

        let branch_args = vec!["--short".to_string(), "HEAD".to_string()];
        match self.step("symbolic-ref", &branch_args, false, working_dir).await {
            Ok(step) => {
                partial.insert("branch".to_string(), json!(step.outcome.stdout.trim()));
            }
            Err(failure) => {
                debug!(error = %failure.message, "Branch lookup failed");
                warnings.push("Could not determine the current branch (detached HEAD?)".to_string());
            }
        }

        match status {
            Ok(step) => {
                let files = parse_porcelain_status(&step.outcome.stdout);
                let clean = files.is_empty();
                partial.insert("clean".to_string(), json!(clean));
                partial.insert("files".to_string(), json!(files));
                let mut data = step.into_data();
                data.warnings.extend(warnings);
                data.details = Some(JsonValue::Object(partial.into_iter().collect()));
                ToolResult::success(data)
            }
            Err(failure) => ToolResult::failure(failure)
                .with_warnings(warnings)
                .with_partial_results(partial),
        }
    }

    /// Working tree or staged diff. `context_lines` is passed as
    /// `--unified <n>` and corrected by the normalizer.
    pub async fn diff(&self, options: &DiffOptions, working_dir: &Path) -> ToolResult {
        let mut args = Vec::new();
        if options.staged {
            args.push("--cached".to_string());
        }
        if options.stat {
            args.push("--stat".to_string());
        }
        if let Some(lines) = options.context_lines {
            args.push("--unified".to_string());
            args.push(lines.to_string());
        }
        if !options.paths.is_empty() {
            args.push("--".to_string());
            args.extend(options.paths.iter().cloned());
        }
        let args = self.normalize(&args);

        if let Err(failure) = ensure_repository(working_dir, &crate::utils::display_command("diff", &args)) {
            return ToolResult::failure(failure);
        }

        match self.step("diff", &args, false, working_dir).await {
            Ok(step) => {
                let empty = step.outcome.stdout.trim().is_empty();
                let mut data = step.into_data();
                if empty {
                    data.warnings.push(if options.staged {
                        "No staged changes to show".to_string()
                    } else {
                        "No unstaged changes to show; try staged=true".to_string()
                    });
                }
                data.details = Some(json!({ "staged": options.staged, "empty": empty }));
                ToolResult::success(data)
            }
            Err(failure) => ToolResult::failure(failure),
        }
    }

    /// Stages paths (which must exist) or everything by mode, then reports
    /// what became newly staged.
    pub async fn add(&self, options: &AddOptions, working_dir: &Path) -> ToolResult {
        let mut args = Vec::new();
        if options.all {
            args.push("-A".to_string());
        } else if options.update {
            args.push("-u".to_string());
        }
        if !options.paths.is_empty() {
            args.push("--".to_string());
            args.extend(options.paths.iter().cloned());
        }
        let invocation = crate::utils::display_command("add", &args);

        if let Err(failure) = ensure_repository(working_dir, &invocation) {
            return ToolResult::failure(failure);
        }

        if options.paths.is_empty() && !options.all && !options.update {
            return ToolResult::failure(
                ToolError::new(ErrorCode::InvalidInput, "No paths given to stage", invocation)
                    .with_suggestion("Pass one or more paths, or set all/update"),
            );
        }

        let missing: Vec<&String> = options
            .paths
            .iter()
            .filter(|p| !working_dir.join(p).exists())
            .collect();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Refusing to stage missing paths");
            return ToolResult::failure(
                ToolError::new(
                    ErrorCode::FileNotFound,
                    format!(
                        "Path(s) not found: {}",
                        missing.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
                    ),
                    invocation,
                )
                .with_details(json!({ "missing": missing }))
                .with_suggestion("Check the paths against git status; use update=true to stage deletions"),
            );
        }

        let mut warnings = Vec::new();
        let before = match self.staged_files(working_dir).await {
            Ok(files) => Some(files),
            Err(failure) => {
                warnings.push(format!("Could not read staged files before adding: {}", failure.message));
                None
            }
        };

        let step = match self.step("add", &args, false, working_dir).await {
            Ok(step) => step,
            Err(failure) => return ToolResult::failure(failure).with_warnings(warnings),
        };

        let mut data = step.into_data();
        match self.staged_files(working_dir).await {
            Ok(after) => {
                let newly_staged: Vec<&String> = match &before {
                    Some(before) => after.iter().filter(|f| !before.contains(f)).collect(),
                    None => after.iter().collect(),
                };
                info!(count = newly_staged.len(), "Staged files");
                data.details = Some(json!({
                    "stagedFiles": after,
                    "newlyStaged": newly_staged,
                }));
            }
            Err(failure) => {
                warnings.push(format!("Could not verify staged files: {}", failure.message));
            }
        }
        data.warnings.extend(warnings);
        ToolResult::success(data)
    }

    /// Validates the message, checks something is staged, then commits
    /// through the message file.
    pub async fn commit(&self, options: &CommitOptions, working_dir: &Path) -> ToolResult {
        let mut args = Vec::new();
        if options.no_verify {
            args.push("--no-verify".to_string());
        }
        let invocation = crate::utils::display_command("commit", &args);

        if let Err(failure) = ensure_repository(working_dir, &invocation) {
            return ToolResult::failure(failure);
        }

        let validation = validate_commit_message(&options.message);
        let empty = options.message.trim().is_empty();
        if (options.validate || empty) && !validation.valid {
            return ToolResult::failure(
                ToolError::new(
                    ErrorCode::InvalidCommitMessage,
                    "Commit message does not follow the conventional commit format",
                    invocation,
                )
                .with_details(json!({ "errors": validation.errors }))
                .with_suggestion(validation.errors.join("; ")),
            );
        }

        let staged = match self.staged_files(working_dir).await {
            Ok(files) => files,
            Err(failure) => return ToolResult::failure(failure),
        };
        if staged.is_empty() {
            return ToolResult::failure(
                ToolError::new(ErrorCode::NoStagedChanges, "There are no staged changes to commit", invocation)
                    .with_suggestion("Stage changes with the add tool before committing"),
            );
        }

        let request = CommandRequest::new("commit", args).with_commit_message(options.message.clone());
        let step = match self.execute_request(&request, working_dir).await {
            Ok(Ok(step)) => step,
            Ok(Err(failure)) => return ToolResult::failure(failure),
            Err(e) => {
                error!(error = ?e, "Unexpected failure while committing");
                return ToolResult::failure(ToolError::unknown(invocation, &e));
            }
        };

        let mut data = step.into_data();
        let mut details = serde_json::Map::new();
        details.insert("committedFiles".to_string(), json!(staged));
        if !self.is_dry_run() {
            let head_args = vec!["HEAD".to_string()];
            match self.step("rev-parse", &head_args, false, working_dir).await {
                Ok(head) => {
                    details.insert("hash".to_string(), json!(head.outcome.stdout.trim()));
                }
                Err(failure) => data
                    .warnings
                    .push(format!("Commit created but its hash could not be read: {}", failure.message)),
            }
        }
        data.details = Some(JsonValue::Object(details));
        ToolResult::success(data)
    }

    async fn staged_files(&self, working_dir: &Path) -> Result<Vec<String>, ToolError> {
        let args = vec!["--cached".to_string(), "--name-only".to_string()];
        self.step("diff", &args, false, working_dir)
            .await
            .map(|step: StepOutput| non_empty_lines(&step.outcome.stdout))
    }
}
