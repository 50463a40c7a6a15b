// autocommit-core/src/git/test_support.rs

//! Scripted executor and logger doubles for the git layer tests.

use super::executor::{ExecutionOutcome, GitExecutor};
use super::logger::{ExecutionLogger, ExecutionRecord};
use crate::errors::ExecutorError;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

type Responder = Box<dyn Fn(&[String]) -> Result<ExecutionOutcome, ExecutorError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub argv: Vec<String>,
    pub working_dir: PathBuf,
    /// Contents of the `-F` file at the moment of the call, if any.
    pub message_file: Option<(PathBuf, String)>,
}

pub struct RecordingExecutor {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Responder,
}

impl RecordingExecutor {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[String]) -> Result<ExecutionOutcome, ExecutorError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Every call succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ok("")))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.argv).collect()
    }
}

#[async_trait]
impl GitExecutor for RecordingExecutor {
    async fn execute(
        &self,
        argv: &[String],
        working_dir: &Path,
        _timeout: Duration,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let message_file = argv
            .iter()
            .position(|a| a == "-F")
            .and_then(|i| argv.get(i + 1))
            .map(PathBuf::from)
            .map(|path| {
                let contents = fs::read_to_string(&path).unwrap_or_else(|e| format!("<unreadable: {}>", e));
                (path, contents)
            });
        self.calls.lock().unwrap().push(RecordedCall {
            argv: argv.to_vec(),
            working_dir: working_dir.to_path_buf(),
            message_file,
        });
        (self.responder)(argv)
    }
}

pub fn ok(stdout: &str) -> ExecutionOutcome {
    ExecutionOutcome {
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: 0,
        duration_ms: 3,
    }
}

pub fn failed(exit_code: i32, stderr: &str) -> ExecutionOutcome {
    ExecutionOutcome {
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code,
        duration_ms: 3,
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ExecutionLogger for RecordingLogger {
    fn log(&self, record: &ExecutionRecord<'_>) {
        self.lines.lock().unwrap().extend(record.lines());
    }
}

/// An empty, freshly initialised repository.
pub fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    git2::Repository::init(dir.path()).expect("Failed to init repository");
    dir
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Leftover commit message files in `dir`.
pub fn message_files_in(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(".autocommit-msg-"))
        })
        .collect()
}
