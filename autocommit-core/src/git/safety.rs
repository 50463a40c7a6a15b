// autocommit-core/src/git/safety.rs

//! Decides whether a requested git command may run.
//!
//! Danger detection is a substring search over `"<command> <args...>"`, so a
//! dangerous phrase anywhere in the joined string blocks the call. This can
//! block an innocent argument that happens to contain a phrase (for example a
//! commit-message search for "reset --hard") and misses equivalent spellings
//! such as `reset -q --hard`. Caution detection is an exact match on the
//! subcommand name only.

use tracing::{debug, warn};

pub const DEFAULT_DANGEROUS_PATTERNS: &[&str] = &[
    "reset --hard",
    "push --force",
    "push -f",
    "clean -f",
    "clean --force",
    "rm -rf",
    "rm -fr",
];

pub const DEFAULT_CAUTION_COMMANDS: &[&str] = &["rebase", "merge", "cherry-pick", "reset"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Refused outright. Holds the phrase or command that matched.
    Blocked { pattern: String },
    /// Allowed, but the success result carries this warning.
    Caution { warning: String },
    Clear,
}

/// The lists the classifier consults. Built once and passed in, so callers
/// (and tests) can substitute their own.
#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    dangerous_patterns: Vec<String>,
    caution_commands: Vec<String>,
    denied_commands: Vec<String>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_DANGEROUS_PATTERNS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_CAUTION_COMMANDS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl SafetyPolicy {
    pub fn new(dangerous_patterns: Vec<String>, caution_commands: Vec<String>) -> Self {
        Self {
            dangerous_patterns,
            caution_commands,
            denied_commands: Vec::new(),
        }
    }

    /// Adds subcommands that are blocked by exact name, like `push` when the
    /// configuration does not permit pushing.
    pub fn with_denied_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denied_commands.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Default lists, plus `push` denied unless `allow_push` is set.
    pub fn for_push_permission(allow_push: bool) -> Self {
        let policy = Self::default();
        if allow_push {
            policy
        } else {
            policy.with_denied_commands(["push"])
        }
    }

    pub fn classify(&self, command: &str, args: &[String], allow_dangerous: bool) -> Classification {
        if !allow_dangerous {
            if let Some(pattern) = self.blocking_pattern(command, args) {
                warn!(command = command, args = ?args, pattern = %pattern, "Blocked dangerous git command");
                return Classification::Blocked { pattern };
            }
        }

        if self.caution_commands.iter().any(|c| c == command) {
            debug!(command = command, "Git command flagged for caution");
            return Classification::Caution {
                warning: format!(
                    "'git {}' can rewrite history or discard work; review the repository state afterwards",
                    command
                ),
            };
        }

        Classification::Clear
    }

    fn blocking_pattern(&self, command: &str, args: &[String]) -> Option<String> {
        if self.denied_commands.iter().any(|c| c == command) {
            return Some(command.to_string());
        }
        let full_command = format!("{} {}", command, args.join(" "));
        self.dangerous_patterns
            .iter()
            .find(|pattern| full_command.contains(pattern.as_str()))
            .cloned()
    }
}
