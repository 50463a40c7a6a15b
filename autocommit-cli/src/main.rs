// autocommit-cli/src/main.rs
mod config;

mod models {
    pub mod cli;
}

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use autocommit_core::prompt::{build_system_prompt, build_task_prompt};
use autocommit_core::{Agent, AgentOutput, AppConfig, ChatMessage, GitToolProvider, ToolExecutionStatus};

use crate::config::{apply_cli_overrides, load_config, resolve_api_key};
use crate::models::cli::Cli;

const LOG_DIR_NAME: &str = "autocommit";
const LOG_FILE_NAME: &str = "autocommit.log";

/// Keeps the non-blocking file writer alive until `main` returns.
type LogGuard = tracing_appender::non_blocking::WorkerGuard;

fn init_logging(verbose: u8) -> Result<(LogGuard, PathBuf)> {
    let default_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let log_dir = dirs::cache_dir()
        .or_else(dirs::runtime_dir)
        .unwrap_or_else(env::temp_dir)
        .join(LOG_DIR_NAME);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let time_format = time::format_description::parse(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
    )
    .context("Failed to parse log time format")?;
    let local_timer = LocalTime::new(time_format);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_timer(local_timer.clone());

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(local_timer)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    info!(
        "Logging initialized. Level determined by RUST_LOG or -v flags (default: {}).",
        default_level
    );
    Ok((guard, log_dir.join(LOG_FILE_NAME)))
}

fn print_summary(output: &AgentOutput, config: &AppConfig) {
    if config.commit.verbose {
        for result in &output.applied_tool_results {
            let marker = match result.status {
                ToolExecutionStatus::Success => "✓".green(),
                ToolExecutionStatus::Failure => "✗".red(),
            };
            println!("{} {} {}", marker, result.tool_name.cyan(), result.input);
        }
        println!();
    }
    if config.commit.dry_run {
        println!("{}", "Dry run: no changes were made to the repository.".yellow());
    }
    match &output.final_message {
        Some(message) => println!("{}", message),
        None => println!("{}", "The agent finished without a summary.".dimmed()),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let working_dir = match &cli.dir {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("Cannot access directory {}", dir.display()))?,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let (mut app_config, config_path) = load_config(cli.config.as_deref(), &working_dir)?;
    apply_cli_overrides(&mut app_config, &cli)?;
    info!(config = ?config_path, working_dir = ?working_dir, "Configuration resolved.");

    let api_key = resolve_api_key(&app_config, |var| env::var(var).ok())?;
    let provider = Arc::new(GitToolProvider::from_config(&app_config));
    let agent = Agent::new(app_config.runtime_config(api_key), provider)?;

    let messages = vec![
        ChatMessage::system(build_system_prompt(&app_config.commit)),
        ChatMessage::user(build_task_prompt(&app_config.commit)),
    ];

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "-"]),
    );
    pb.set_message("Reviewing changes...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let agent_result = agent.run(messages, &working_dir).await;
    pb.finish_and_clear();

    let output = agent_result.context("Agent run encountered an error")?;
    info!(iterations = output.iterations, tool_calls = output.applied_tool_results.len(), "Agent run completed.");
    print_summary(&output, &app_config);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    colored::control::set_override(true);
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _guard = match init_logging(cli.verbose) {
        Ok((guard, log_path)) => {
            info!("Logging to stderr and {}", log_path.display());
            guard
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    colored::control::unset_override();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Operation failed: {:#}", e);
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}
