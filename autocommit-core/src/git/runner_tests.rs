// autocommit-core/src/git/runner_tests.rs
#![cfg(test)]

use super::runner::GitCommandRunner;
use super::safety::SafetyPolicy;
use super::test_support::*;
use super::{CommandRequest, ErrorCode, ToolResult};
use crate::errors::ExecutorError;
use std::io;
use std::sync::Arc;
use std::time::Duration;

fn runner_with(executor: Arc<RecordingExecutor>) -> GitCommandRunner {
    GitCommandRunner::new(executor)
}

fn assert_exclusive(result: &ToolResult) {
    assert_eq!(result.is_success(), result.data().is_some(), "data must be set iff success");
    assert_eq!(!result.is_success(), result.error().is_some(), "error must be set iff failure");
}

#[tokio::test]
async fn test_hard_reset_is_blocked_without_spawning() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("reset", ["--hard", "HEAD~1"]);
    let result = runner.run(&request, repo.path()).await;

    assert_exclusive(&result);
    assert!(!result.is_success());
    let error = result.error().unwrap();
    assert_eq!(error.code, ErrorCode::DangerousCommandBlocked);
    assert!(!error.recoverable);
    assert_eq!(error.command, "git reset --hard HEAD~1");
    assert!(error.suggestion.as_deref().unwrap().contains("allowDangerous"));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_override_executes_once_and_keeps_caution_warning() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("reset", ["--hard", "HEAD~1"]).allow_dangerous(true);
    let result = runner.run(&request, repo.path()).await;

    assert_exclusive(&result);
    assert!(result.is_success());
    assert_eq!(executor.argvs(), vec![strings(&["reset", "--hard", "HEAD~1"])]);
    assert_eq!(executor.calls()[0].working_dir, repo.path());
    let data = result.data().unwrap();
    assert_eq!(data.warnings.len(), 1);
    assert!(data.warnings[0].contains("git reset"));
}

#[tokio::test]
async fn test_force_push_blocked_in_any_spelling() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    for args in [["-f", "origin"], ["--force", "origin"]] {
        let result = runner.run(&CommandRequest::new("push", args), repo.path()).await;
        assert_eq!(result.error_code(), Some(ErrorCode::DangerousCommandBlocked));
    }
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_diff_arguments_are_normalized() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let result = runner.run(&CommandRequest::new("diff", ["--unified", "3"]), repo.path()).await;

    assert!(result.is_success());
    assert_eq!(executor.argvs(), vec![strings(&["diff", "--unified=3"])]);
    assert_eq!(result.data().unwrap().command, "git diff --unified=3");
}

#[tokio::test]
async fn test_commit_message_goes_through_temp_file() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());
    let message = "feat: x\n\nbody line";

    let request = CommandRequest::new("commit", Vec::<String>::new()).with_commit_message(message);
    let result = runner.run(&request, repo.path()).await;

    assert!(result.is_success());
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let argv = &calls[0].argv;
    assert_eq!(argv[0], "commit");
    assert_eq!(argv[1], "-F");
    let (path, contents) = calls[0].message_file.clone().unwrap();
    assert_eq!(argv[2], path.display().to_string());
    assert!(path.starts_with(repo.path()));
    assert_eq!(contents, message);
    assert!(!path.exists());
    assert!(message_files_in(repo.path()).is_empty());
}

#[tokio::test]
async fn test_inline_message_flag_is_removed() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("commit", ["-m", "wip", "--signoff"])
        .with_commit_message("fix(parser): handle tabs");
    runner.run(&request, repo.path()).await;

    let argv = &executor.argvs()[0];
    assert!(!argv.contains(&"-m".to_string()));
    assert!(!argv.contains(&"wip".to_string()));
    assert_eq!(argv[1], "-F");
    assert_eq!(argv.last().unwrap(), "--signoff");
}

#[tokio::test]
async fn test_clustered_message_flag_is_replaced_by_file() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("commit", ["-am", "wip"]).with_commit_message("fix(parser): handle tabs");
    runner.run(&request, repo.path()).await;

    let call = &executor.calls()[0];
    assert_eq!(call.argv.len(), 4, "{:?}", call.argv);
    assert_eq!(call.argv[1], "-F");
    assert_eq!(call.argv[3], "-a");
    assert_eq!(call.message_file.as_ref().unwrap().1, "fix(parser): handle tabs");
}

#[tokio::test]
async fn test_empty_commit_message_does_not_stage_file() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("commit", ["--amend", "--no-edit"]).with_commit_message("");
    runner.run(&request, repo.path()).await;

    assert_eq!(executor.argvs(), vec![strings(&["commit", "--amend", "--no-edit"])]);
}

#[tokio::test]
async fn test_message_for_other_commands_is_ignored() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("log", ["-1"]).with_commit_message("feat: ignored");
    runner.run(&request, repo.path()).await;

    assert_eq!(executor.argvs(), vec![strings(&["log", "-1"])]);
    assert!(executor.calls()[0].message_file.is_none());
}

#[tokio::test]
async fn test_temp_file_removed_when_commit_fails() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::new(|_| Ok(failed(1, "nothing to commit"))));
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("commit", Vec::<String>::new()).with_commit_message("fix: y");
    let result = runner.run(&request, repo.path()).await;

    assert_exclusive(&result);
    let error = result.error().unwrap();
    assert_eq!(error.code, ErrorCode::GitCommandFailed);
    assert!(error.recoverable);
    assert!(error.suggestion.is_some());
    assert_eq!(error.details.as_ref().unwrap()["exitCode"], 1);
    assert_eq!(error.details.as_ref().unwrap()["stderr"], "nothing to commit");
    assert!(message_files_in(repo.path()).is_empty());
}

#[tokio::test]
async fn test_temp_file_removed_when_executor_errors() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::new(|_| {
        Err(ExecutorError::Spawn {
            program: "git".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        })
    }));
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("commit", Vec::<String>::new()).with_commit_message("fix: z");
    let result = runner.run(&request, repo.path()).await;

    assert_exclusive(&result);
    assert_eq!(result.error_code(), Some(ErrorCode::UnknownError));
    assert!(result.error().unwrap().recoverable);
    assert_eq!(executor.calls().len(), 1);
    assert!(message_files_in(repo.path()).is_empty());
}

#[tokio::test]
async fn test_temp_file_removed_when_commit_is_blocked() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let request = CommandRequest::new("commit", ["--", "rm -rf"]).with_commit_message("chore: cleanup");
    let result = runner.run(&request, repo.path()).await;

    assert_eq!(result.error_code(), Some(ErrorCode::DangerousCommandBlocked));
    assert!(executor.calls().is_empty());
    assert!(message_files_in(repo.path()).is_empty());
}

#[tokio::test]
async fn test_timeout_is_reported_as_command_failure() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::new(|argv| {
        Err(ExecutorError::Timeout {
            command: argv.join(" "),
            timeout: Duration::from_millis(30_000),
        })
    }));
    let runner = runner_with(executor.clone());

    let result = runner.run(&CommandRequest::new("fetch", ["origin"]), repo.path()).await;

    let error = result.error().unwrap();
    assert_eq!(error.code, ErrorCode::GitCommandFailed);
    assert!(error.recoverable);
    assert!(error.message.contains("timed out"));
    assert_eq!(error.details.as_ref().unwrap()["timeoutMs"], 30_000);
}

#[tokio::test]
async fn test_not_a_repository() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone());

    let result = runner.run(&CommandRequest::new("status", Vec::<String>::new()), dir.path()).await;

    assert_exclusive(&result);
    let error = result.error().unwrap();
    assert_eq!(error.code, ErrorCode::NotGitRepo);
    assert!(!error.recoverable);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_push_denied_unless_permitted() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());

    let denied = runner_with(executor.clone()).with_policy(SafetyPolicy::for_push_permission(false));
    let result = denied.run(&CommandRequest::new("push", ["origin", "main"]), repo.path()).await;
    assert_eq!(result.error_code(), Some(ErrorCode::DangerousCommandBlocked));
    assert!(executor.calls().is_empty());

    let permitted = runner_with(executor.clone()).with_policy(SafetyPolicy::for_push_permission(true));
    let result = permitted.run(&CommandRequest::new("push", ["origin", "main"]), repo.path()).await;
    assert!(result.is_success());
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_dry_run_skips_mutating_commands_only() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::new(|_| Ok(ok("## main\n"))));
    let runner = runner_with(executor.clone()).with_dry_run(true);

    let commit = CommandRequest::new("commit", Vec::<String>::new()).with_commit_message("feat: dry");
    let result = runner.run(&commit, repo.path()).await;
    assert!(result.is_success());
    assert!(result.data().unwrap().warnings.iter().any(|w| w.starts_with("Dry run")));
    assert!(executor.calls().is_empty());
    assert!(message_files_in(repo.path()).is_empty());

    let status = runner.run(&CommandRequest::new("status", ["-sb"]), repo.path()).await;
    assert!(status.is_success());
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_dry_run_only_spawns_read_only_commands() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor.clone()).with_dry_run(true);

    for command in ["pull", "fetch", "apply", "am", "update-ref", "config", "notes", "worktree", "gc"] {
        let result = runner.run(&CommandRequest::new(command, ["x"]), repo.path()).await;
        assert!(result.is_success(), "{} should be skipped, not failed", command);
        assert!(result.data().unwrap().warnings.iter().any(|w| w.starts_with("Dry run")));
    }
    for (command, args) in [
        ("branch", vec!["new-feature"]),
        ("tag", vec!["v1.0"]),
        ("stash", vec![]),
    ] {
        runner.run(&CommandRequest::new(command, args), repo.path()).await;
    }
    assert!(executor.calls().is_empty(), "{:?}", executor.argvs());

    for (command, args) in [
        ("log", vec!["--oneline"]),
        ("branch", vec!["--show-current"]),
        ("stash", vec!["list"]),
        ("tag", vec![]),
    ] {
        runner.run(&CommandRequest::new(command, args), repo.path()).await;
    }
    assert_eq!(
        executor.argvs(),
        vec![
            strings(&["log", "--oneline"]),
            strings(&["branch", "--show-current"]),
            strings(&["stash", "list"]),
            strings(&["tag"]),
        ]
    );
}

#[tokio::test]
async fn test_every_invocation_is_logged() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::new(|argv| {
        if argv[0] == "log" {
            Ok(failed(128, "fatal: bad revision 'nope'"))
        } else {
            Ok(ok("clean"))
        }
    }));
    let logger = Arc::new(RecordingLogger::default());
    let runner = runner_with(executor).with_logger(logger.clone());

    runner.run(&CommandRequest::new("status", Vec::<String>::new()), repo.path()).await;
    runner.run(&CommandRequest::new("log", ["nope"]), repo.path()).await;
    runner.run(&CommandRequest::new("reset", ["--hard"]), repo.path()).await;

    let lines = logger.lines();
    assert_eq!(lines.len(), 5, "{:?}", lines);
    assert!(lines[0].starts_with("✓ git status ("));
    assert!(lines[1].starts_with("✗ git log nope ("));
    assert_eq!(lines[2], "  Error: fatal: bad revision 'nope'");
    assert_eq!(lines[3], "✗ git reset --hard (0ms)");
    assert_eq!(lines[4], "  Error: blocked by pattern 'reset --hard'");
}

#[tokio::test]
async fn test_dry_run_skips_are_logged() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let logger = Arc::new(RecordingLogger::default());
    let runner = runner_with(executor.clone()).with_logger(logger.clone()).with_dry_run(true);

    runner.run(&CommandRequest::new("add", ["-A"]), repo.path()).await;

    assert!(executor.calls().is_empty());
    assert_eq!(logger.lines(), vec!["✓ git add -A (0ms) [skipped (dry run)]".to_string()]);
}

#[tokio::test]
async fn test_serialized_result_has_exactly_one_payload() {
    let repo = init_repo();
    let executor = Arc::new(RecordingExecutor::succeeding());
    let runner = runner_with(executor);

    for request in [
        CommandRequest::new("status", Vec::<String>::new()),
        CommandRequest::new("clean", ["-fdx"]),
    ] {
        let value: serde_json::Value =
            serde_json::from_str(&runner.run(&request, repo.path()).await.to_json_string()).unwrap();
        let success = value["success"].as_bool().unwrap();
        assert_eq!(value.get("data").is_some(), success);
        assert_eq!(value.get("error").is_some(), !success);
    }
}
