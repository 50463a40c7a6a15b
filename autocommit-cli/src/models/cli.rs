// autocommit-cli/src/models/cli.rs
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// autocommit: summarize the pending changes of a git working tree and
/// commit them with a conventional commit message.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase message verbosity.
    ///
    ///  -v:  INFO level
    ///  -vv: DEBUG level
    ///  -vvv: TRACE level
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Force the commit type (feat, fix, docs, ...).
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub commit_type: Option<String>,

    /// Force the commit scope.
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Maximum subject line length (1 to 72).
    #[arg(long, value_name = "N")]
    pub max_length: Option<usize>,

    /// How much the commit body should say: brief, normal or detailed.
    #[arg(short, long)]
    pub detail: Option<String>,

    /// End the body with a per-file breakdown.
    #[arg(long)]
    pub breakdown: bool,

    /// What to stage before committing: all, modified or none.
    #[arg(long, value_name = "MODE")]
    pub auto_stage: Option<String>,

    /// Allow the agent to push after committing.
    #[arg(long)]
    pub push: bool,

    /// Skip commit hooks (--no-verify).
    #[arg(long)]
    pub no_verify: bool,

    /// Accept commit messages outside the conventional format.
    #[arg(long)]
    pub no_strict: bool,

    /// Report mutating git commands without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Path to a configuration file (default: autocommit.toml in this or a
    /// parent directory, then the user config directory).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Repository working directory (default: current directory).
    #[arg(short = 'C', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,
}
