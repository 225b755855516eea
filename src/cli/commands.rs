//! Command implementations

use crate::cli::args::OutputFormat;
use crate::completion::HttpCompletionClient;
use crate::config::ForgeConfig;
use crate::error::ForgeError;
use crate::protocol::{
    generate_template, today, validate_value, GenerationOrchestrator, Protocol, ResponseParser,
    Section,
};
use crate::server::{self, ApiState};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Read a whole input file, or stdin when `path` is `-`
pub async fn read_input(path: &Path) -> Result<String, ForgeError> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .map_err(|e| ForgeError::from(e).with_context("stdin"))?;
        return Ok(buffer);
    }

    debug!("Reading input from {}", path.display());
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ForgeError::from(e).with_context(path.display()))
}

fn orchestrator_for(config: &ForgeConfig, offline: bool) -> Result<GenerationOrchestrator> {
    if offline {
        return Ok(GenerationOrchestrator::offline());
    }
    let client = HttpCompletionClient::new(&config.completion)?;
    Ok(GenerationOrchestrator::new(Arc::new(client))
        .with_timeout(Duration::from_secs(config.completion.timeout_secs)))
}

fn render_sections(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        out.push_str(&format!("## {}\n\n{}\n\n", section.title, section.content));
    }
    out.trim_end().to_string()
}

pub async fn run_generate_command(
    input: &Path,
    date: Option<String>,
    offline: bool,
    format: OutputFormat,
    config: &ForgeConfig,
) -> Result<()> {
    let raw = read_input(input).await?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ForgeError::from(e).with_context(input.display()))?;
    let descriptor = validate_value(&value).map_err(ForgeError::from)?;

    let date = date.unwrap_or_else(today);
    let outcome = orchestrator_for(config, offline)?
        .generate_outcome(&descriptor, &date)
        .await
        .map_err(ForgeError::from)?;

    if let Some(reason) = &outcome.fallback_reason {
        if !offline {
            eprintln!("Note: protocol generated locally ({reason})");
        }
    }

    let protocol = outcome.protocol;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&protocol)?),
        OutputFormat::Markdown => println!("{}", protocol.to_markdown()),
    }
    Ok(())
}

pub async fn run_parse_command(input: &Path, format: OutputFormat) -> Result<()> {
    let text = read_input(input).await?;
    let sections = ResponseParser::new().parse(&text);
    debug!("Parsed {} sections", sections.len());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sections)?),
        OutputFormat::Markdown => println!("{}", render_sections(&sections)),
    }
    Ok(())
}

pub async fn run_template_command(input: &Path) -> Result<()> {
    let raw = read_input(input).await?;
    let protocol: Protocol =
        serde_json::from_str(&raw).map_err(|e| ForgeError::from(e).with_context(input.display()))?;

    let template = generate_template(&protocol);
    println!("{}", serde_json::to_string_pretty(&template)?);
    Ok(())
}

pub async fn run_serve_command(bind: Option<String>, config: &ForgeConfig) -> Result<()> {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let client = HttpCompletionClient::new(&config.completion)?;
    info!("Using completion endpoint {}", client.endpoint());

    let state = ApiState::new(
        Arc::new(client),
        Duration::from_secs(config.completion.timeout_secs),
    );
    server::serve(&addr, state).await
}
