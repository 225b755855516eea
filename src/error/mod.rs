use std::fmt::Display;
use thiserror::Error;

pub mod codes;

pub use codes::ErrorCode;

use crate::protocol::ValidationError;

/// The unified error type for protocol-forge
///
/// Completion failures never appear here: the orchestrator absorbs them
/// into a locally generated protocol.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ForgeError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Validation { source: src, .. }
            | Self::Storage { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Validation { message, .. }
            | Self::Storage { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Validation { .. } => 3,
            Self::Storage { .. } => 4,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Validation { code, .. }
            | Self::Storage { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Validation { message, field, .. } => match field {
                Some(f) => format!("Invalid experiment '{}': {}", f, message),
                None => format!("Invalid experiment: {}", message),
            },
            Self::Storage { message, .. } => format!("File error: {}", message),
        }
    }

    /// Get a developer-friendly error message with the source chain
    pub fn developer_message(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        out
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let (code, message) = match err.kind() {
            ErrorKind::NotFound => (ErrorCode::STORAGE_NOT_FOUND, "File or directory not found"),
            ErrorKind::PermissionDenied => {
                (ErrorCode::STORAGE_PERMISSION_DENIED, "Permission denied")
            }
            _ => (ErrorCode::STORAGE_IO_ERROR, "IO operation failed"),
        };

        ForgeError::storage_with_code(code, message).with_source(err)
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::Validation {
            code: ErrorCode::VALIDATION_INVALID_INPUT,
            message: "Invalid JSON input".to_string(),
            field: None,
            source: None,
        }
        .with_source(err)
    }
}

impl From<toml::de::Error> for ForgeError {
    fn from(err: toml::de::Error) -> Self {
        ForgeError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax")
            .with_source(err)
    }
}

impl From<ValidationError> for ForgeError {
    fn from(err: ValidationError) -> Self {
        let code = if err.field.is_some() {
            ErrorCode::VALIDATION_REQUIRED_FIELD
        } else {
            ErrorCode::VALIDATION_INVALID_TYPE
        };
        ForgeError::Validation {
            code,
            message: err.message,
            field: err.field,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation_and_chaining() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "descriptor.json");
        let err = ForgeError::from(io_err).with_context("while reading input");

        assert_eq!(err.code(), ErrorCode::STORAGE_NOT_FOUND);
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("[E3004]"));
        assert!(err.user_message().contains("while reading input"));
        assert!(err.developer_message().contains("caused by: descriptor.json"));
    }

    #[test]
    fn test_source_is_exposed_through_error_trait() {
        let err = ForgeError::config("bad endpoint")
            .with_source(std::io::Error::other("dns failure"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("dns failure"));

        let bare = ForgeError::config("no source");
        assert!(std::error::Error::source(&bare).is_none());
    }

    #[test]
    fn test_validation_conversion() {
        let err: ForgeError = ValidationError::for_field("title", "title is required").into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.code(), ErrorCode::VALIDATION_REQUIRED_FIELD);
        assert_eq!(
            err.user_message(),
            "Invalid experiment 'title': title is required"
        );
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ForgeError::from(json_err);
        assert_eq!(err.code(), ErrorCode::VALIDATION_INVALID_INPUT);
        assert!(err.developer_message().contains("caused by:"));
    }
}
