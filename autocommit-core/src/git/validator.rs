// autocommit-core/src/git/validator.rs

//! Conventional-commit checks on a message's first line.

use lazy_static::lazy_static;
use regex::Regex;

pub const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore", "revert",
];

pub const MAX_SUBJECT_LENGTH: usize = 72;

lazy_static! {
    static ref CONVENTIONAL_SUBJECT: Regex = Regex::new(&format!(
        r"^({})(\([^()]+\))?!?: \S.*$",
        COMMIT_TYPES.join("|")
    ))
    .expect("conventional commit pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

pub fn validate_commit_message(message: &str) -> ValidationResult {
    if message.trim().is_empty() {
        return ValidationResult::from_errors(vec!["Commit message cannot be empty".to_string()]);
    }

    let mut errors = Vec::new();
    let subject = message.lines().next().unwrap_or_default();

    if !CONVENTIONAL_SUBJECT.is_match(subject) {
        errors.push(format!(
            "First line must follow the conventional commit format '<type>(<scope>): <description>' with type one of: {}",
            COMMIT_TYPES.join(", ")
        ));
    }

    let subject_length = subject.chars().count();
    if subject_length > MAX_SUBJECT_LENGTH {
        errors.push(format!(
            "First line is {} characters long; keep it within {} characters",
            subject_length, MAX_SUBJECT_LENGTH
        ));
    }

    ValidationResult::from_errors(errors)
}
