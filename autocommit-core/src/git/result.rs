// autocommit-core/src/git/result.rs

//! The success/error envelope returned by every git tool.
//!
//! A [`ToolResult`] carries either [`ToolData`] or a [`ToolError`], never
//! both. The fields are private so the only way to build one is through
//! [`ToolResult::success`] and [`ToolResult::failure`].

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Machine-readable failure codes surfaced as `error.code`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotGitRepo,
    DangerousCommandBlocked,
    GitCommandFailed,
    InvalidCommitMessage,
    NoStagedChanges,
    FileNotFound,
    InvalidInput,
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotGitRepo => "NOT_GIT_REPO",
            ErrorCode::DangerousCommandBlocked => "DANGEROUS_COMMAND_BLOCKED",
            ErrorCode::GitCommandFailed => "GIT_COMMAND_FAILED",
            ErrorCode::InvalidCommitMessage => "INVALID_COMMIT_MESSAGE",
            ErrorCode::NoStagedChanges => "NO_STAGED_CHANGES",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a successful call.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolData {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Subprocess wall-clock time in milliseconds.
    pub execution_time: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Structured extras produced by the convenience wrappers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

/// Payload of a failed call.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            command: command.into(),
            details: None,
            recoverable: true,
            suggestion: None,
        }
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn unrecoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }

    pub fn not_git_repo(command: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NotGitRepo,
            "The working directory is not inside a git repository",
            command,
        )
        .with_details(JsonValue::String(details.into()))
        .with_suggestion("Run 'git init' or change into an existing repository before retrying")
        .unrecoverable()
    }

    pub fn dangerous(command: impl Into<String>, pattern: &str) -> Self {
        Self::new(
            ErrorCode::DangerousCommandBlocked,
            format!("Command blocked because it matches the dangerous pattern '{}'", pattern),
            command,
        )
        .with_details(serde_json::json!({ "pattern": pattern }))
        .with_suggestion("If this is intentional, retry with allowDangerous set to true")
        .unrecoverable()
    }

    pub fn unknown(command: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::new(
            ErrorCode::UnknownError,
            format!("Unexpected error: {}", err),
            command,
        )
        .with_details(JsonValue::String(format!("{:#}", err)))
        .with_suggestion("Inspect the repository state and retry the operation")
    }
}

/// The structure returned across the tool boundary.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ToolData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ToolError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial_results: Option<BTreeMap<String, JsonValue>>,
}

impl ToolResult {
    pub fn success(data: ToolData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            warnings: Vec::new(),
            partial_results: None,
        }
    }

    pub fn failure(error: ToolError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            warnings: Vec::new(),
            partial_results: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_partial_results(mut self, partial: BTreeMap<String, JsonValue>) -> Self {
        if !partial.is_empty() {
            self.partial_results = Some(partial);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&ToolData> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Shorthand for `error().map(|e| e.code)`.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn partial_results(&self) -> Option<&BTreeMap<String, JsonValue>> {
        self.partial_results.as_ref()
    }

    /// Serializes to the JSON text handed back to the model.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":{{\"code\":\"UNKNOWN_ERROR\",\"message\":\"Failed to serialize tool result: {}\",\"command\":\"\",\"recoverable\":true}}}}",
                e
            )
        })
    }
}
