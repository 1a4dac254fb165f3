//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::narrative::{Length, Tone};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub narrative: NarrativeConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Narrative backend configuration
///
/// The live backend is used iff `api_key` is set and non-empty.
#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub tone: Tone,

    #[serde(default)]
    pub length: Length,

    /// Replaces the built-in closing line; may use narrative placeholders
    #[serde(default)]
    pub closing: Option<String>,
}

fn default_llm_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    8000
}

fn default_temperature() -> f32 {
    0.4
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_url(),
            model: default_llm_model(),
            timeout_ms: default_llm_timeout(),
            temperature: default_temperature(),
            tone: Tone::default(),
            length: Length::default(),
            closing: None,
        }
    }
}

/// Request handling limits
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_days")]
    pub default_days: u32,

    /// Larger windows are clamped to this
    #[serde(default = "default_max_days")]
    pub max_days: u32,

    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,

    /// Last day of the built-in sample dataset; today when unset
    #[serde(default)]
    pub sample_anchor: Option<NaiveDate>,
}

fn default_days() -> u32 {
    7
}

fn default_max_days() -> u32 {
    30
}

fn default_max_query_chars() -> usize {
    10_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_days: default_days(),
            max_days: default_max_days(),
            max_query_chars: default_max_query_chars(),
            sample_anchor: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("aurora").join("config.toml")),
            Some(PathBuf::from("/etc/aurora/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("AURORA_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("AURORA_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Narrative overrides
        if let Some(key) = lookup("AURORA_LLM_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.narrative.api_key = Some(key);
        }
        if let Some(url) = lookup("AURORA_LLM_URL") {
            self.narrative.base_url = url;
        }
        if let Some(model) = lookup("AURORA_LLM_MODEL") {
            self.narrative.model = model;
        }
        if let Some(timeout) = lookup("AURORA_LLM_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.narrative.timeout_ms = ms;
            }
        }
        if let Some(tone) = lookup("AURORA_NARRATIVE_TONE") {
            match tone.parse() {
                Ok(t) => self.narrative.tone = t,
                Err(e) => tracing::warn!("Ignoring AURORA_NARRATIVE_TONE: {}", e),
            }
        }
        if let Some(length) = lookup("AURORA_NARRATIVE_LENGTH") {
            match length.parse() {
                Ok(l) => self.narrative.length = l,
                Err(e) => tracing::warn!("Ignoring AURORA_NARRATIVE_LENGTH: {}", e),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("AURORA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AURORA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Aurora Configuration
#
# Environment variables override these settings:
# - AURORA_API_HOST
# - AURORA_API_PORT
# - AURORA_LLM_API_KEY (falls back to OPENAI_API_KEY)
# - AURORA_LLM_URL
# - AURORA_LLM_MODEL
# - AURORA_LLM_TIMEOUT_MS
# - AURORA_NARRATIVE_TONE
# - AURORA_NARRATIVE_LENGTH
# - AURORA_LOG_LEVEL
# - AURORA_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8000

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://localhost:5173"]

[narrative]
# API key for the hosted completion model. Leave unset to use templates.
# api_key = ""

# OpenAI-compatible base URL
base_url = "https://api.openai.com/v1"

# Model name
model = "gpt-4o-mini"

# Completion timeout (ms); on timeout the template narrative is used
timeout_ms = 8000

# Sampling temperature
temperature = 0.4

# Tone: professional, casual, technical
tone = "professional"

# Length: short, medium, long
length = "medium"

# Custom closing line, replacing the tone's default. Placeholders such as
# {record_count} or {avg_hrv} are filled from the analysis.
# closing = "That covers {record_count} readings."

[pipeline]
# Window used when a request has no days value
default_days = 7

# Larger windows are clamped
max_days = 30

# Maximum query length (characters)
max_query_chars = 10000

# Last day of the sample dataset (defaults to today)
# sample_anchor = "2024-07-07"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
