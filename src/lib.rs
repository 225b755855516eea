//! # protocol-forge
//!
//! Turns experiment metadata into sectioned laboratory protocols. A language
//! model is tried first; any failure falls back to a deterministic generator,
//! so valid input always yields a protocol.
//!
//! ## Usage
//!
//! ```bash
//! protocol-forge generate --input experiment.json [--offline] [--format markdown]
//! protocol-forge serve [--bind 127.0.0.1:3000]
//! ```
//!
//! ## Modules
//!
//! - `protocol` - Data model and the generation pipeline
//! - `completion` - Completion service boundary (HTTP and mock clients)
//! - `server` - REST API over the pipeline
//! - `config` - Layered configuration (defaults, TOML, environment)
//! - `error` - Crate-wide error type with stable codes
//! - `app` - Logging and fatal error handling
//! - `cli` - Command-line interface
pub mod app;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;

pub use completion::{
    CompletionClient, GenerationError, HttpCompletionClient, MockCompletionClient,
};
pub use error::{ForgeError, Result};
pub use protocol::{
    generate_fallback, generate_template, DataTemplate, ExperimentDescriptor,
    GenerationOrchestrator, Protocol, ResponseParser, Section, ValidationError,
};
