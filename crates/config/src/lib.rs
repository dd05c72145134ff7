//! Configuration loading, validation, and management for Jarvis.
//!
//! Loads configuration from `~/.jarvis/config.toml` with environment
//! variable overrides. Validates all settings at startup; a missing API key
//! is reported through [`AppConfig::require_api_key`] before any model
//! client is built.

use jarvis_core::agent::AgentConfig;
use jarvis_core::memory::ViewPolicy;
use jarvis_core::provider::ModelParameters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.jarvis/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider name used in logs
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per model response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Model retry settings
    #[serde(default)]
    pub retry: RetrySettings,

    /// Search tool settings
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4-turbo-preview".into()
}
fn default_temperature() -> f32 {
    0.6
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("agent", &self.agent)
            .field("retry", &self.retry)
            .field("search", &self.search)
            .finish()
    }
}

fn is_blank(key: &str) -> bool {
    key.trim().is_empty()
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Tool cycles allowed per turn before a fallback answer is forced
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Most recent turns included in each prompt (0 = unlimited)
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Token budget for history in each prompt; overrides `history_window`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_token_budget: Option<usize>,

    /// Turns kept in memory between turns; older ones are dropped for good
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_retain: Option<usize>,
}

fn default_max_iterations() -> u32 {
    3
}
fn default_history_window() -> usize {
    20
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            history_window: default_history_window(),
            history_token_budget: None,
            history_retain: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Deadline for each HTTP request to the model endpoint
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_max_delay_ms() -> u64 {
    8_000
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// DuckDuckGo instant answer endpoint
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum snippets folded into one observation
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_true() -> bool {
    true
}
fn default_search_endpoint() -> String {
    "https://api.duckduckgo.com/".into()
}
fn default_search_timeout_secs() -> u64 {
    15
}
fn default_max_results() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_search_endpoint(),
            timeout_secs: default_search_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.jarvis/config.toml).
    ///
    /// Environment variables override the file:
    /// - `JARVIS_API_KEY`, then `OPENAI_API_KEY` (only if the file key is absent or blank)
    /// - `JARVIS_MODEL`
    /// - `JARVIS_API_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
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

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.as_deref().is_none_or(is_blank) {
            self.api_key = lookup("JARVIS_API_KEY")
                .filter(|k| !is_blank(k))
                .or_else(|| lookup("OPENAI_API_KEY").filter(|k| !is_blank(k)));
        }

        if let Some(model) = lookup("JARVIS_MODEL") {
            self.model = model;
        }

        if let Some(url) = lookup("JARVIS_API_URL") {
            self.api_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".jarvis")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.agent.history_retain == Some(0) {
            return Err(ConfigError::ValidationError(
                "agent.history_retain must be at least 1".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        Ok(())
    }

    /// The API key, or the startup-time error explaining its absence.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !is_blank(k))
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Sampling parameters for every model call.
    pub fn model_parameters(&self) -> ModelParameters {
        ModelParameters {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..ModelParameters::default()
        }
    }

    /// How much history each prompt carries.
    pub fn view_policy(&self) -> ViewPolicy {
        match (self.agent.history_token_budget, self.agent.history_window) {
            (Some(budget), _) => ViewPolicy::TokenBudget(budget),
            (None, 0) => ViewPolicy::All,
            (None, n) => ViewPolicy::LastTurns(n),
        }
    }

    /// Per-session agent configuration derived from this file.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            max_iterations: self.agent.max_iterations,
            model_parameters: self.model_parameters(),
            history: self.view_policy(),
            retention: self.agent.history_retain.map(ViewPolicy::LastTurns),
        }
    }

    /// Generate a default config TOML string (for `jarvis init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            agent: AgentSettings::default(),
            retry: RetrySettings::default(),
            search: SearchConfig::default(),
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

    #[error("No API key configured; set OPENAI_API_KEY or JARVIS_API_KEY")]
    MissingApiKey,
}
