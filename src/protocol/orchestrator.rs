//! Generation orchestration
//!
//! One external attempt, bounded by a timeout, then the deterministic
//! generator. Only input validation can fail a request; every problem with
//! the completion service is absorbed into a fallback protocol.

use super::fallback::generate_fallback;
use super::parser::ResponseParser;
use super::prompt::PromptBuilder;
use super::validator::{validate_descriptor, validate_value, ValidationError};
use super::{ExperimentDescriptor, Protocol};
use crate::completion::{CompletionClient, GenerationError};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A produced protocol and, when the fallback was used, the reason
#[derive(Debug)]
pub struct GenerationOutcome {
    pub protocol: Protocol,
    pub fallback_reason: Option<GenerationError>,
}

impl GenerationOutcome {
    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

pub struct GenerationOrchestrator {
    client: Option<Arc<dyn CompletionClient>>,
    prompt_builder: PromptBuilder,
    parser: ResponseParser,
    timeout: Duration,
}

impl GenerationOrchestrator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client: Some(client),
            prompt_builder: PromptBuilder::new(),
            parser: ResponseParser::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Orchestrator that always uses the deterministic generator
    pub fn offline() -> Self {
        Self {
            client: None,
            prompt_builder: PromptBuilder::new(),
            parser: ResponseParser::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generate a protocol for `descriptor` dated `date`
    pub async fn generate(
        &self,
        descriptor: &ExperimentDescriptor,
        date: &str,
    ) -> Result<Protocol, ValidationError> {
        Ok(self.generate_outcome(descriptor, date).await?.protocol)
    }

    /// Validate raw JSON input, then generate
    pub async fn generate_from_value(
        &self,
        input: &Value,
        date: &str,
    ) -> Result<Protocol, ValidationError> {
        let descriptor = validate_value(input)?;
        self.generate(&descriptor, date).await
    }

    /// Like [`generate`](Self::generate) but keeps the fallback reason
    pub async fn generate_outcome(
        &self,
        descriptor: &ExperimentDescriptor,
        date: &str,
    ) -> Result<GenerationOutcome, ValidationError> {
        self.generate_until(descriptor, date, std::future::pending::<()>())
            .await
    }

    /// Generate, abandoning the external call as soon as `cancel` resolves
    ///
    /// A cancelled attempt resolves through the fallback generator.
    pub async fn generate_until<F>(
        &self,
        descriptor: &ExperimentDescriptor,
        date: &str,
        cancel: F,
    ) -> Result<GenerationOutcome, ValidationError>
    where
        F: Future<Output = ()> + Send,
    {
        let descriptor = validate_descriptor(descriptor)?;

        let attempt = tokio::select! {
            result = self.attempt_external(descriptor, date) => result,
            _ = cancel => Err(GenerationError::Cancelled),
        };

        let outcome = match attempt {
            Ok(protocol) => {
                info!(
                    "Generated protocol '{}' from model output ({} sections)",
                    protocol.title,
                    protocol.sections.len()
                );
                GenerationOutcome {
                    protocol,
                    fallback_reason: None,
                }
            }
            Err(reason) => {
                warn!(
                    "External generation failed for '{}', using deterministic generator: {}",
                    descriptor.title, reason
                );
                GenerationOutcome {
                    protocol: generate_fallback(descriptor, date),
                    fallback_reason: Some(reason),
                }
            }
        };

        Ok(outcome)
    }

    async fn attempt_external(
        &self,
        descriptor: &ExperimentDescriptor,
        date: &str,
    ) -> Result<Protocol, GenerationError> {
        let client = self.client.as_ref().ok_or(GenerationError::Unavailable)?;
        let prompt = self.prompt_builder.build(descriptor);

        debug!(
            "Requesting completion for '{}' (timeout {:?})",
            descriptor.title, self.timeout
        );

        let text = tokio::time::timeout(self.timeout, client.complete(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))??;

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let sections = self.parser.parse(&text);
        if sections.is_empty() {
            return Err(GenerationError::NoSections);
        }

        Ok(Protocol::new(descriptor.title.trim(), date, sections, true))
    }
}
