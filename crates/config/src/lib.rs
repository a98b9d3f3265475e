//! Configuration loading, validation, and management for tagtty.
//!
//! Loads configuration from `~/.tagtty/config.toml` with environment
//! variable overrides. Validates all settings at startup. The loaded value
//! is passed explicitly to every consumer; nothing is stored globally.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagtty_core::message::TurnFormat;

/// The root configuration structure.
///
/// Maps directly to `~/.tagtty/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Organization ID sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Force a prompt shape; inferred from the model name when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_format: Option<TurnFormat>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Max tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Word budget for assembled prompts
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,

    /// Reduce flat-prompt history to ranked key phrases
    #[serde(default = "default_true")]
    pub context_keywords_only: bool,

    /// Keep line breaks when printing responses
    #[serde(default)]
    pub preserve_new_lines: bool,

    /// Label printed before the user's question
    #[serde(default = "default_your_name")]
    pub your_name: String,

    /// Label printed before the model's response
    #[serde(default = "default_gpt_name")]
    pub gpt_name: String,

    /// Path of the `|`-delimited conversation log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// HTTP timeout for completion requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_max_tokens() -> u32 {
    250
}
fn default_max_context_length() -> usize {
    150
}
fn default_true() -> bool {
    true
}
fn default_your_name() -> String {
    "question".into()
}
fn default_gpt_name() -> String {
    "response".into()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("output.txt")
}
fn default_request_timeout_secs() -> u64 {
    15
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("org_id", &self.org_id)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("turn_format", &self.turn_format)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_context_length", &self.max_context_length)
            .field("context_keywords_only", &self.context_keywords_only)
            .field("preserve_new_lines", &self.preserve_new_lines)
            .field("your_name", &self.your_name)
            .field("gpt_name", &self.gpt_name)
            .field("log_file", &self.log_file)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.tagtty/config.toml).
    ///
    /// Environment variables take precedence over the file:
    /// - `TAGTTY_API_KEY`, then `OPENAI_API_KEY` (only when no key is configured)
    /// - `TAGTTY_MODEL`
    /// - `TAGTTY_LOG_FILE`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_path())
    }

    /// Load from an explicit path, then apply environment overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = env("TAGTTY_API_KEY").or_else(|| env("OPENAI_API_KEY"));
        }

        if let Some(model) = env("TAGTTY_MODEL") {
            self.model = model;
        }

        if let Some(log_file) = env("TAGTTY_LOG_FILE") {
            self.log_file = PathBuf::from(log_file);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tagtty")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if self.log_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "log_file must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// The prompt shape to use: the configured one, or inferred from the model.
    pub fn effective_turn_format(&self) -> TurnFormat {
        self.turn_format
            .unwrap_or_else(|| TurnFormat::infer(&self.model))
    }

    /// Render the settings as `key: value` lines, with the API key redacted.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("api_key: {}", redact(&self.api_key)),
            format!("org_id: {}", self.org_id.as_deref().unwrap_or("")),
            format!("api_url: {}", self.api_url),
            format!("model: {}", self.model),
            format!("turn_format: {:?}", self.effective_turn_format()),
            format!("temperature: {}", self.temperature),
            format!("max_tokens: {}", self.max_tokens),
            format!("max_context_length: {}", self.max_context_length),
            format!("context_keywords_only: {}", self.context_keywords_only),
            format!("preserve_new_lines: {}", self.preserve_new_lines),
            format!("your_name: {}", self.your_name),
            format!("gpt_name: {}", self.gpt_name),
            format!("log_file: {}", self.log_file.display()),
            format!("request_timeout_secs: {}", self.request_timeout_secs),
        ]
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            org_id: None,
            api_url: default_api_url(),
            model: default_model(),
            turn_format: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            max_context_length: default_max_context_length(),
            context_keywords_only: true,
            preserve_new_lines: false,
            your_name: default_your_name(),
            gpt_name: default_gpt_name(),
            log_file: default_log_file(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
