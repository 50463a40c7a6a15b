// autocommit-cli/src/config.rs

//! Locating, loading and overriding the configuration.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use autocommit_core::config::{AppConfig, AutoStage, DetailLevel};

use crate::models::cli::Cli;

pub const CONFIG_FILENAME: &str = "autocommit.toml";
const USER_CONFIG_DIR: &str = "autocommit";
const USER_CONFIG_FILENAME: &str = "config.toml";

/// Walks up from `start` looking for `autocommit.toml`.
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(USER_CONFIG_DIR).join(USER_CONFIG_FILENAME))
        .filter(|p| p.is_file())
}

/// Loads the configuration from `explicit`, else the nearest project file,
/// else the user file, else defaults. Returns the file used, if any.
pub fn load_config(explicit: Option<&Path>, start_dir: &Path) -> Result<(AppConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(anyhow!("Configuration file not found: {}", path.display()));
            }
            Some(path.to_path_buf())
        }
        None => find_project_config(start_dir).or_else(user_config_path),
    };

    let Some(path) = path else {
        info!("No configuration file found; using defaults.");
        return Ok((AppConfig::default(), None));
    };

    info!("Found configuration file at: {:?}", path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read configuration file: {:?}", path))?;
    let config = AppConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse or validate {:?}", path))?;
    Ok((config, Some(path)))
}

/// Command-line flags win over file values. Re-validates the result.
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> Result<()> {
    let commit = &mut config.commit;
    if let Some(commit_type) = &cli.commit_type {
        commit.commit_type = Some(commit_type.to_ascii_lowercase());
    }
    if let Some(scope) = &cli.scope {
        commit.scope = Some(scope.clone());
    }
    if let Some(max_length) = cli.max_length {
        commit.max_subject_length = max_length;
    }
    if let Some(detail) = &cli.detail {
        commit.detail = detail.parse::<DetailLevel>()?;
    }
    if let Some(auto_stage) = &cli.auto_stage {
        commit.auto_stage = auto_stage.parse::<AutoStage>()?;
    }
    commit.file_breakdown |= cli.breakdown;
    commit.allow_push |= cli.push;
    commit.skip_hooks |= cli.no_verify;
    commit.dry_run |= cli.dry_run;
    commit.verbose |= cli.verbose > 0;
    if cli.no_strict {
        commit.strict = false;
    }
    debug!(commit = ?config.commit, "Applied command-line overrides");
    config.validate().context("Invalid option")
}

/// Reads the API key from the environment variable named in `[model]`.
pub fn resolve_api_key<F>(config: &AppConfig, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let var = &config.model.api_key_env_var;
    match lookup(var) {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(anyhow!(
            "API key environment variable '{}' is not set. Export it or add it to a .env file.",
            var
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_find_project_config_walks_up() {
        let root = tempdir().unwrap();
        let nested = root.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(find_project_config(&nested), Some(root.path().join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[model]\nmodel_name = \"local-model\"\n\n[commit]\nscope = \"cli\"\n").unwrap();

        let (config, used) = load_config(Some(&path), dir.path()).unwrap();

        assert_eq!(used, Some(path));
        assert_eq!(config.model.model_name, "local-model");
        assert_eq!(config.commit.scope.as_deref(), Some("cli"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "[model]\nendpoint = \"not a url\"\n").unwrap();

        let err = load_config(None, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("endpoint"));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config =
            AppConfig::from_toml_str("[commit]\ncommit_type = \"docs\"\nstrict = true\n").unwrap();
        let cli = Cli::parse_from([
            "autocommit",
            "--type",
            "Fix",
            "--detail",
            "detailed",
            "--auto-stage",
            "modified",
            "--no-strict",
            "--push",
            "-n",
            "-v",
        ]);

        apply_cli_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.commit.commit_type.as_deref(), Some("fix"));
        assert_eq!(config.commit.detail, DetailLevel::Detailed);
        assert_eq!(config.commit.auto_stage, AutoStage::Modified);
        assert!(!config.commit.strict);
        assert!(config.commit.allow_push);
        assert!(config.commit.dry_run);
        assert!(config.commit.verbose);
    }

    #[test]
    fn test_bad_override_values_are_rejected() {
        let mut config = AppConfig::default();
        let cli = Cli::parse_from(["autocommit", "--type", "feature"]);
        assert!(apply_cli_overrides(&mut config, &cli).is_err());

        let mut config = AppConfig::default();
        let cli = Cli::parse_from(["autocommit", "--detail", "verbose"]);
        assert!(apply_cli_overrides(&mut config, &cli).is_err());

        let mut config = AppConfig::default();
        let cli = Cli::parse_from(["autocommit", "--max-length", "100"]);
        let err = apply_cli_overrides(&mut config, &cli).unwrap_err();
        assert!(format!("{:#}", err).contains("max_subject_length"));
    }

    #[test]
    fn test_resolve_api_key() {
        let config = AppConfig::default();
        let key = resolve_api_key(&config, |var| (var == "OPENAI_API_KEY").then(|| "sk-test".to_string()));
        assert_eq!(key.unwrap(), "sk-test");

        let err = resolve_api_key(&config, |_| Some("  ".to_string())).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
