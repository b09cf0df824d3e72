//! Runtime configuration
//!
//! A single `AppConfig` is constructed once at process start (YAML
//! file when present, defaults otherwise, CLI overrides on top) and
//! passed by reference into the backend and orchestrator constructors.
//! No credentials live at module scope.

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which LLM provider backs the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    OpenAi,
    #[default]
    Gemini,
}

impl std::str::FromStr for BackendProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(Error::config(format!("unknown backend provider: {other}"))),
        }
    }
}

/// Classifier backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider selection
    #[serde(default)]
    pub provider: BackendProvider,

    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Base API URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; when empty the provider's environment variable is read
    /// at load time
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Backoff applied around each backend call
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::default(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: String::new(),
            temperature: default_temperature(),
            retry: RetryPolicy::default(),
        }
    }
}

impl BackendConfig {
    /// Environment variable holding the provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self.provider {
            BackendProvider::OpenAi => "OPENAI_API_KEY",
            BackendProvider::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Fill the API key from the environment if not set explicitly
    pub fn resolve_api_key(&mut self) -> Result<()> {
        if self.api_key.is_empty() {
            self.api_key = std::env::var(self.api_key_env())
                .map_err(|_| Error::config(format!("{} is not set", self.api_key_env())))?;
        }
        Ok(())
    }
}

fn default_model() -> String {
    "gemini-1.0-pro".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

/// Batch job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Comments JSONL path
    #[serde(default = "default_comments_path")]
    pub comments_path: PathBuf,

    /// Replies JSONL path
    #[serde(default = "default_replies_path")]
    pub replies_path: PathBuf,

    /// Output log path (appended)
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Checkpoint file path
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,

    /// Root comments per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Concurrent units of work per batch
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Reply-tree depth guard
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Whole-unit attempt budget
    #[serde(default = "default_unit_attempts")]
    pub unit_attempts: u32,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            comments_path: default_comments_path(),
            replies_path: default_replies_path(),
            output_path: default_output_path(),
            checkpoint_path: default_checkpoint_path(),
            batch_size: default_batch_size(),
            workers: default_workers(),
            max_depth: default_max_depth(),
            unit_attempts: default_unit_attempts(),
        }
    }
}

fn default_comments_path() -> PathBuf {
    PathBuf::from("./data/comments.jsonl")
}

fn default_replies_path() -> PathBuf {
    PathBuf::from("./data/replies.jsonl")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./data/hate_output.jsonl")
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("./data/hate_output_checkpoint.txt")
}

fn default_batch_size() -> usize {
    800
}

fn default_workers() -> usize {
    8
}

fn default_max_depth() -> usize {
    128
}

fn default_unit_attempts() -> u32 {
    2
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend selection and credentials
    #[serde(default)]
    pub backend: BackendConfig,

    /// Batch job parameters
    #[serde(default)]
    pub job: JobConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults
    /// when the file does not exist
    pub fn load(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {e}", config_path.display())))
        } else {
            Ok(Self::default())
        }
    }
}
