// autocommit-core/src/git/staging.rs

//! Passes multi-line commit messages to git through a file.
//!
//! A [`CommitMessageFile`] owns a temporary file in the working directory and
//! removes it when dropped, so every return path of the caller (including
//! early returns and `?`) cleans up.

use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Placeholder some callers leave in `args` where an inline message was
/// meant to go. Any argument starting with it is dropped.
pub const MESSAGE_PLACEHOLDER: &str = "__COMMIT_MESSAGE__";

const FILE_PREFIX: &str = ".autocommit-msg-";

#[derive(Debug)]
pub struct CommitMessageFile {
    path: PathBuf,
}

impl CommitMessageFile {
    /// Writes `message` verbatim to a fresh timestamp-named file in `dir`.
    pub fn create(dir: &Path, message: &str) -> io::Result<Self> {
        let path = dir.join(format!("{}{}.txt", FILE_PREFIX, Utc::now().timestamp_millis()));
        fs::write(&path, message)?;
        debug!(path = %path.display(), bytes = message.len(), "Wrote commit message file");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strips inline-message flags from `args` and prepends `-F <file>`.
    pub fn rewrite_args(&self, args: &[String]) -> Vec<String> {
        let mut rewritten = vec!["-F".to_string(), self.path.display().to_string()];
        rewritten.extend(strip_inline_message(args));
        rewritten
    }
}

impl Drop for CommitMessageFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed commit message file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove commit message file"),
        }
    }
}

/// Removes `-m <value>`, `--message <value>`, `--message=...`, clustered
/// forms such as `-am <value>` or `-mfix`, and placeholder fragments.
fn strip_inline_message(args: &[String]) -> Vec<String> {
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            kept.push(arg.clone());
            kept.extend(iter.cloned());
            break;
        }
        if arg == "--message" {
            iter.next();
            continue;
        }
        if arg.starts_with("--message=") || arg.starts_with(MESSAGE_PLACEHOLDER) {
            continue;
        }
        if let Some((rest, value_follows)) = split_message_flag(arg) {
            if value_follows {
                iter.next();
            }
            if rest != "-" {
                kept.push(rest);
            }
            continue;
        }
        kept.push(arg.clone());
    }
    kept
}

/// Finds `m` in a short-flag cluster. Returns the cluster without `m` and
/// its value, and whether the value is the next argument. Flags after a
/// value-taking option are that option's value, so scanning stops there.
fn split_message_flag(arg: &str) -> Option<(String, bool)> {
    let cluster = arg
        .strip_prefix('-')
        .filter(|c| !c.is_empty() && !c.starts_with('-'))?;
    for (i, flag) in cluster.char_indices() {
        match flag {
            'm' => {
                let value_follows = cluster[i + 1..].is_empty();
                return Some((format!("-{}", &cluster[..i]), value_follows));
            }
            'F' | 'c' | 'C' | 't' => return None,
            _ => {}
        }
    }
    None
}
