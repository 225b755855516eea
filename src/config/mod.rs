//! Configuration for the completion client, server and logging
//!
//! Values are layered: built-in defaults, then a TOML file, then
//! `PROTOCOL_FORGE_*` environment variables (highest priority).

use crate::error::{ErrorCode, ForgeError, Result};
use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::{load_config, CONFIG_FILE_NAME};

/// Valid log levels for configuration validation.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub log_level: String,
    pub completion: CompletionConfig,
    pub server: ServerConfig,
}

/// Chat-completions endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            completion: CompletionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".to_string(),
            api_key: None,
            model: "local-model".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            timeout_secs: 60,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl ForgeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` in place of the process environment
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("PROTOCOL_FORGE_ENDPOINT") {
            self.completion.endpoint = endpoint;
        }

        if let Some(key) = lookup("PROTOCOL_FORGE_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.completion.api_key = Some(key);
        }

        if let Some(model) = lookup("PROTOCOL_FORGE_MODEL") {
            self.completion.model = model;
        }

        if let Some(timeout) = lookup("PROTOCOL_FORGE_TIMEOUT_SECS") {
            self.completion.timeout_secs = timeout.trim().parse().map_err(|e| {
                ForgeError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("PROTOCOL_FORGE_TIMEOUT_SECS must be a whole number, got '{timeout}'"),
                )
                .with_source(e)
            })?;
        }

        if let Some(bind) = lookup("PROTOCOL_FORGE_BIND") {
            self.server.bind = bind;
        }

        if let Some(level) = lookup("PROTOCOL_FORGE_LOG_LEVEL") {
            self.log_level = level.to_lowercase();
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| {
            Err(ForgeError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, message))
        };

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return invalid(format!(
                "log_level must be one of {}, got '{}'",
                VALID_LOG_LEVELS.join(", "),
                self.log_level
            ));
        }
        if self.completion.timeout_secs == 0 {
            return invalid("completion.timeout_secs must be greater than zero".to_string());
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return invalid(format!(
                "completion.temperature must be between 0 and 2, got {}",
                self.completion.temperature
            ));
        }
        if let Err(e) = url::Url::parse(&self.completion.endpoint) {
            return invalid(format!(
                "completion.endpoint '{}' is not a valid URL: {e}",
                self.completion.endpoint
            ));
        }
        Ok(())
    }
}
