//! Application configuration
//!
//! Runtime settings derived from command-line flags.

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Log level from the config file, used when no `-v` flag is given
    pub configured_level: Option<String>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            configured_level: None,
        }
    }

    pub fn with_configured_level(mut self, level: impl Into<String>) -> Self {
        self.configured_level = Some(level.into());
        self
    }

    /// Get the log filter string based on verbosity
    pub fn log_level(&self) -> String {
        match self.verbose {
            0 => self
                .configured_level
                .clone()
                .unwrap_or_else(|| "info".to_string()),
            1 => "debug".to_string(),
            2 => "trace".to_string(),
            _ => "trace,hyper=debug,tower=debug".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
