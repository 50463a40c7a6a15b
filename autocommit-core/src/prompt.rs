// autocommit-core/src/prompt.rs

//! System and task instructions derived from [`CommitConfig`].

use crate::config::{AutoStage, CommitConfig, DetailLevel};
use crate::git::validator::COMMIT_TYPES;
use std::fmt::Write;

pub fn build_system_prompt(config: &CommitConfig) -> String {
    let mut prompt = String::from(
        "You are autocommit, an agent that turns the pending changes of a git working tree \
         into well-described commits. You act only through the provided git tools; every tool \
         returns JSON with a `success` flag and either `data` or `error`.\n\n",
    );

    prompt.push_str("Rules:\n");
    prompt.push_str("- Inspect before you act: check status and read the diff first.\n");
    prompt.push_str(
        "- Pass multi-line commit messages through `commitMessage` (or the `git_commit` tool), never with `-m`.\n",
    );
    prompt.push_str(
        "- Commands matching destructive patterns are blocked. Do not set `allowDangerous` unless the task explicitly requires it.\n",
    );
    prompt.push_str("- When an error is marked `recoverable: false`, stop and report it instead of retrying.\n");
    if !config.allow_push {
        prompt.push_str("- Never push. Pushing is disabled for this run.\n");
    }
    if config.dry_run {
        prompt.push_str("- This is a dry run: mutating commands are reported but not executed.\n");
    }

    let _ = write!(
        prompt,
        "\nCommit messages use the conventional commit format `<type>(<scope>): <description>` \
         with type one of {}. Keep the subject line at most {} characters, imperative mood, no trailing period.\n",
        COMMIT_TYPES.join(", "),
        config.max_subject_length
    );
    if config.strict {
        prompt.push_str("Messages that do not follow this format are rejected.\n");
    }

    prompt.push_str("\nWhen finished, reply with a short summary of what was committed.");
    prompt
}

pub fn build_task_prompt(config: &CommitConfig) -> String {
    let mut lines = Vec::new();

    lines.push(match config.auto_stage {
        AutoStage::All => "Stage all changes, including untracked files, then commit them.".to_string(),
        AutoStage::Modified => {
            "Stage modified and deleted tracked files only (leave untracked files alone), then commit them."
                .to_string()
        }
        AutoStage::None => {
            "Do not stage anything. Commit only what is already staged; if nothing is staged, stop and say so."
                .to_string()
        }
    });

    match (&config.commit_type, &config.scope) {
        (Some(commit_type), Some(scope)) => {
            lines.push(format!("Use the commit type `{}` with scope `{}`.", commit_type, scope))
        }
        (Some(commit_type), None) => lines.push(format!("Use the commit type `{}`.", commit_type)),
        (None, Some(scope)) => lines.push(format!("Use the scope `{}`.", scope)),
        (None, None) => lines.push("Choose the commit type and scope that best describe the change.".to_string()),
    }

    lines.push(
        match config.detail {
            DetailLevel::Brief => "Write only a subject line, no body.",
            DetailLevel::Normal => "Add a short body explaining what changed and why.",
            DetailLevel::Detailed => {
                "Add a detailed body covering what changed, why, and any notable implementation details."
            }
        }
        .to_string(),
    );

    if config.file_breakdown {
        lines.push("End the body with a bullet list of the changed files and what changed in each.".to_string());
    }
    if config.skip_hooks {
        lines.push("Skip commit hooks.".to_string());
    }
    if config.allow_push {
        lines.push("After committing, push the current branch to its upstream.".to_string());
    }

    lines.join("\n")
}
