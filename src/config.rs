//! Configuration loading and management for summarize-url.
//!
//! Loads settings from `summarize-url.toml` with environment variable overrides for sensitive data.

use crate::summarizer::SummarizerSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// File name searched for in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "summarize-url.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing API key: set OPENAI_API_KEY or [api].openai_key")]
    MissingApiKey,
}

/// Language-model endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Model identifier (e.g., "gpt-4o-mini")
    pub model: String,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Cap on generated tokens
    pub max_tokens: u32,
    /// Request timeout for the completion call
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: 1000,
            timeout_secs: 600,
        }
    }
}

impl SummarizerConfig {
    /// `timeout_secs`, with 0 meaning the default
    pub fn effective_timeout_secs(&self) -> u64 {
        match self.timeout_secs {
            0 => Self::default().timeout_secs,
            secs => secs,
        }
    }
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub openai_key: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from `path`, or from the standard locations when `None`.
    ///
    /// An explicit path must exist. Without one, a missing file means defaults.
    /// Environment overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::find_config_file() {
                Some(found) => Self::load_from(&found)?,
                None => {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(toml::from_str(&content)?)
    }

    /// Override settings from environment-like lookups
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.api.openai_key = Some(key);
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|u| !u.is_empty()) {
            self.summarizer.base_url = base_url;
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.is_empty()) {
            self.summarizer.model = model;
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("summarize-url")
            .join(CONFIG_FILE_NAME);
        home_config.exists().then_some(home_config)
    }

    /// Get the OpenAI API key
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api
            .openai_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Resolve everything the summarizer needs, failing if no key is configured
    pub fn summarizer_settings(&self) -> Result<SummarizerSettings, ConfigError> {
        Ok(SummarizerSettings {
            api_key: self.api_key()?.to_string(),
            base_url: self.summarizer.base_url.clone(),
            model: self.summarizer.model.clone(),
            max_tokens: self.summarizer.max_tokens,
            timeout: Duration::from_secs(self.summarizer.effective_timeout_secs()),
        })
    }
}
