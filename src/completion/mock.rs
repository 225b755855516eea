//! In-memory completion client for tests

use super::{CompletionClient, GenerationError};
use crate::protocol::PromptPair;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type QueuedResponses = Arc<Mutex<VecDeque<Result<String, GenerationError>>>>;

/// Mock implementation of [`CompletionClient`]
///
/// Returns queued responses in order and records every prompt it receives.
/// With an empty queue every call fails with [`GenerationError::Unavailable`].
#[derive(Clone, Default)]
pub struct MockCompletionClient {
    responses: QueuedResponses,
    received: Arc<Mutex<Vec<PromptPair>>>,
    delay: Option<Duration>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn add_response(&self, response: Result<String, GenerationError>) {
        self.responses.lock().await.push_back(response);
    }

    pub async fn add_success_response(&self, text: &str) {
        self.add_response(Ok(text.to_string())).await;
    }

    pub async fn add_error_response(&self, error: GenerationError) {
        self.add_response(Err(error)).await;
    }

    pub async fn received_prompts(&self) -> Vec<PromptPair> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &PromptPair) -> Result<String, GenerationError> {
        self.received.lock().await.push(prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(GenerationError::Unavailable))
    }
}
