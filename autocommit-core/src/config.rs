// autocommit-core/src/config.rs

//! Configuration structures and parsing for the agent library.
//!
//! The file format is TOML with two tables: `[model]` for the chat API and
//! `[commit]` for how commits are produced. Every key has a default, so an
//! empty file is valid.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const DEFAULT_SUBJECT_LENGTH: usize = 72;
pub const DEFAULT_GIT_TIMEOUT_MS: u64 = 30_000;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub commit: CommitConfig,
    #[serde(default)]
    pub git: GitSection,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModelSection {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub parameters: Option<toml::Value>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            endpoint: default_endpoint(),
            api_key_env_var: default_api_key_env_var(),
            max_iterations: default_max_iterations(),
            parameters: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct GitSection {
    /// Program invoked for every git command.
    #[serde(default = "default_git_program")]
    pub program: String,
    #[serde(default = "default_git_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GitSection {
    fn default() -> Self {
        Self {
            program: default_git_program(),
            timeout_ms: default_git_timeout_ms(),
        }
    }
}

impl GitSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// How much the commit body should say.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Brief,
    #[default]
    Normal,
    Detailed,
}

/// What the agent stages before committing.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AutoStage {
    #[default]
    All,
    Modified,
    None,
}

/// The read-only options that shape prompts and commit behaviour.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CommitConfig {
    #[serde(default)]
    pub commit_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default = "default_subject_length")]
    pub max_subject_length: usize,
    #[serde(default)]
    pub detail: DetailLevel,
    #[serde(default)]
    pub file_breakdown: bool,
    #[serde(default)]
    pub auto_stage: AutoStage,
    #[serde(default)]
    pub allow_push: bool,
    #[serde(default)]
    pub skip_hooks: bool,
    #[serde(default = "default_true")]
    pub strict: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            commit_type: None,
            scope: None,
            max_subject_length: DEFAULT_SUBJECT_LENGTH,
            detail: DetailLevel::default(),
            file_breakdown: false,
            auto_stage: AutoStage::default(),
            allow_push: false,
            skip_hooks: false,
            strict: true,
            dry_run: false,
            verbose: false,
        }
    }
}

/// Model settings resolved for a single run.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_name: String,
    pub endpoint: String,
    pub parameters: toml::Value,
}

/// Everything the agent loop needs: the model, its key and the loop bound.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub model: ModelConfig,
    pub api_key: String,
    pub max_iterations: usize,
}

impl AppConfig {
    pub fn from_toml_str(config_toml_content: &str) -> Result<AppConfig> {
        let config: AppConfig = match toml::from_str(config_toml_content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse TOML content");
                return Err(anyhow!(e))
                    .context("Failed to parse configuration TOML content. Check TOML syntax.");
            }
        };
        config.validate()?;
        tracing::debug!("Parsed and validated autocommit configuration.");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        if model.model_name.trim().is_empty() {
            return Err(anyhow!("'model.model_name' is empty."));
        }
        if model.endpoint.trim().is_empty() {
            return Err(anyhow!("'model.endpoint' is empty."));
        }
        Url::parse(&model.endpoint).with_context(|| {
            format!("Invalid URL format for 'model.endpoint' ('{}').", model.endpoint)
        })?;
        if model.max_iterations == 0 {
            return Err(anyhow!("'model.max_iterations' must be at least 1."));
        }
        if let Some(params) = &model.parameters {
            if !params.is_table() {
                return Err(anyhow!(
                    "'model.parameters' must be a TOML table, found {}.",
                    params.type_str()
                ));
            }
        }

        let subject_ceiling = crate::git::validator::MAX_SUBJECT_LENGTH;
        if !(1..=subject_ceiling).contains(&self.commit.max_subject_length) {
            return Err(anyhow!(
                "'commit.max_subject_length' must be between 1 and {}, found {}.",
                subject_ceiling,
                self.commit.max_subject_length
            ));
        }
        if let Some(commit_type) = &self.commit.commit_type {
            if !crate::git::validator::COMMIT_TYPES.contains(&commit_type.as_str()) {
                return Err(anyhow!(
                    "'commit.commit_type' must be one of {}, found '{}'.",
                    crate::git::validator::COMMIT_TYPES.join(", "),
                    commit_type
                ));
            }
        }

        if self.git.program.trim().is_empty() {
            return Err(anyhow!("'git.program' is empty."));
        }
        if self.git.timeout_ms == 0 {
            return Err(anyhow!("'git.timeout_ms' must be positive."));
        }
        Ok(())
    }

    /// Resolves the model section into a [`RuntimeConfig`] with the given key.
    pub fn runtime_config(&self, api_key: String) -> RuntimeConfig {
        RuntimeConfig {
            model: ModelConfig {
                model_name: self.model.model_name.clone(),
                endpoint: self.model.endpoint.clone(),
                parameters: self
                    .model
                    .parameters
                    .clone()
                    .unwrap_or_else(|| toml::Value::Table(Default::default())),
            },
            api_key,
            max_iterations: self.model.max_iterations,
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetailLevel::Brief => "brief",
            DetailLevel::Normal => "normal",
            DetailLevel::Detailed => "detailed",
        };
        f.write_str(s)
    }
}

impl FromStr for DetailLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "brief" => Ok(DetailLevel::Brief),
            "normal" => Ok(DetailLevel::Normal),
            "detailed" => Ok(DetailLevel::Detailed),
            other => Err(anyhow!(
                "Unknown detail level '{}'. Expected brief, normal or detailed.",
                other
            )),
        }
    }
}

impl fmt::Display for AutoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AutoStage::All => "all",
            AutoStage::Modified => "modified",
            AutoStage::None => "none",
        };
        f.write_str(s)
    }
}

impl FromStr for AutoStage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(AutoStage::All),
            "modified" => Ok(AutoStage::Modified),
            "none" => Ok(AutoStage::None),
            other => Err(anyhow!(
                "Unknown auto-stage mode '{}'. Expected all, modified or none.",
                other
            )),
        }
    }
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_key_env_var() -> String {
    DEFAULT_API_KEY_ENV_VAR.to_string()
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_subject_length() -> usize {
    DEFAULT_SUBJECT_LENGTH
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_git_timeout_ms() -> u64 {
    DEFAULT_GIT_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}
