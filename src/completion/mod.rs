//! Completion service boundary
//!
//! The orchestrator talks to a language model only through
//! [`CompletionClient`], so tests and offline runs can swap in
//! [`MockCompletionClient`] for the HTTP implementation.

use crate::protocol::PromptPair;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpCompletionClient;
pub use mock::MockCompletionClient;

/// Why an external generation attempt produced nothing usable
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion service returned an empty response")]
    EmptyResponse,

    #[error("completion response could not be decoded: {0}")]
    Malformed(String),

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation was cancelled")]
    Cancelled,

    #[error("completion text contained no sections")]
    NoSections,

    #[error("no completion client configured")]
    Unavailable,
}

/// A language model completion service
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one system/user prompt pair and return the raw completion text
    async fn complete(&self, prompt: &PromptPair) -> Result<String, GenerationError>;
}
