//! End-to-end tests for the generation pipeline

mod common;

use anyhow::Result;
use common::{full_descriptor, minimal_descriptor, MARKED_RESPONSE};
use protocol_forge::completion::{GenerationError, MockCompletionClient};
use protocol_forge::protocol::{fallback_sections, generate_fallback, slugify};
use protocol_forge::{generate_template, GenerationOrchestrator, ResponseParser};
use std::sync::Arc;
use std::time::Duration;

const DATE: &str = "2024-03-15";

fn orchestrator(mock: &MockCompletionClient) -> GenerationOrchestrator {
    GenerationOrchestrator::new(Arc::new(mock.clone())).with_timeout(Duration::from_millis(200))
}

#[tokio::test]
async fn test_model_output_becomes_sections() -> Result<()> {
    let mock = MockCompletionClient::new();
    mock.add_success_response(MARKED_RESPONSE).await;

    let protocol = orchestrator(&mock).generate(&full_descriptor(), DATE).await?;

    assert!(protocol.ai_generated);
    assert_eq!(protocol.date, DATE);
    let ids: Vec<_> = protocol.sections.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["materials_and_equipment", "procedure", "data_analysis"]
    );
    assert!(protocol.sections[1].content.contains("Add substrate"));
    Ok(())
}

#[tokio::test]
async fn test_every_failure_matches_direct_fallback() -> Result<()> {
    let failures = vec![
        Err(GenerationError::Transport("connection refused".into())),
        Err(GenerationError::Status {
            status: 500,
            body: "internal".into(),
        }),
        Ok(String::new()),
        Ok("   \n\t".to_string()),
    ];

    for failure in failures {
        let mock = MockCompletionClient::new();
        mock.add_response(failure).await;

        let descriptor = full_descriptor();
        let protocol = orchestrator(&mock).generate(&descriptor, DATE).await?;
        let direct = generate_fallback(&descriptor, DATE);

        assert!(!protocol.ai_generated);
        assert_eq!(protocol.title, direct.title);
        assert_eq!(protocol.date, direct.date);
        assert_eq!(protocol.sections, direct.sections);
    }
    Ok(())
}

#[tokio::test]
async fn test_timeout_matches_direct_fallback() -> Result<()> {
    let mock = MockCompletionClient::new().with_delay(Duration::from_secs(10));
    mock.add_success_response(MARKED_RESPONSE).await;

    let outcome = orchestrator(&mock)
        .generate_outcome(&minimal_descriptor(), DATE)
        .await?;

    assert!(matches!(
        outcome.fallback_reason,
        Some(GenerationError::Timeout(_))
    ));
    assert_eq!(
        outcome.protocol.sections,
        fallback_sections(&minimal_descriptor())
    );
    Ok(())
}

#[tokio::test]
async fn test_protocol_is_never_empty() -> Result<()> {
    let responses = vec!["", "just one line of prose", "## Only Heading", MARKED_RESPONSE];
    for response in responses {
        let mock = MockCompletionClient::new();
        mock.add_success_response(response).await;

        let protocol = orchestrator(&mock).generate(&minimal_descriptor(), DATE).await?;
        assert!(!protocol.sections.is_empty(), "empty for {response:?}");
    }

    let offline = GenerationOrchestrator::offline()
        .generate(&minimal_descriptor(), DATE)
        .await?;
    assert!(!offline.sections.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_invalid_json_input_is_rejected_before_any_call() {
    let mock = MockCompletionClient::new();
    mock.add_success_response(MARKED_RESPONSE).await;
    let orchestrator = orchestrator(&mock);

    let inputs = vec![
        serde_json::json!(null),
        serde_json::json!({}),
        serde_json::json!({"title": 7}),
        serde_json::json!({"title": "   "}),
        serde_json::json!({"title": "ok", "analysisTypes": "anova"}),
    ];
    for input in inputs {
        assert!(
            orchestrator.generate_from_value(&input, DATE).await.is_err(),
            "accepted {input}"
        );
    }
    assert!(mock.received_prompts().await.is_empty());
}

#[test]
fn test_markdown_headings_round_trip() {
    let titles = ["Overview", "Sample Preparation", "Measurement", "Clean Up"];
    let text: String = titles
        .iter()
        .map(|t| format!("## {t}\nBody for {t}.\n\n"))
        .collect();

    let sections = ResponseParser::new().parse(&text);

    assert_eq!(sections.len(), titles.len());
    for (section, title) in sections.iter().zip(titles) {
        assert_eq!(section.title, title);
        assert_eq!(section.id, slugify(title));
        assert_eq!(section.content, format!("Body for {title}."));
    }
}

#[test]
fn test_parse_is_idempotent() {
    let parser = ResponseParser::new();
    for text in [MARKED_RESPONSE, "", "plain text only", "INTRO\nx\n\nMETHODS\ny"] {
        assert_eq!(parser.parse(text), parser.parse(text));
    }
}

#[test]
fn test_degenerate_input_yields_placeholder_section() {
    let parser = ResponseParser::new();
    for text in ["", "   ", "\n\n\t\n"] {
        let sections = parser.parse(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Protocol Content");
        assert_eq!(sections[0].content, "");
    }
}

#[tokio::test]
async fn test_template_follows_generated_protocol() -> Result<()> {
    let protocol = GenerationOrchestrator::offline()
        .generate(&full_descriptor(), DATE)
        .await?;
    let template = generate_template(&protocol);

    let ids: Vec<_> = template.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.first(), Some(&"sample_id"));
    assert_eq!(ids.last(), Some(&"notes"));
    assert!(ids.contains(&"replicate"));
    assert_eq!(template.suggested_rows, 20);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_generations_are_independent() -> Result<()> {
    let answering = MockCompletionClient::new().with_delay(Duration::from_millis(50));
    answering.add_success_response(MARKED_RESPONSE).await;
    let failing = MockCompletionClient::new().with_delay(Duration::from_millis(50));
    failing
        .add_error_response(GenerationError::Status {
            status: 503,
            body: "overloaded".into(),
        })
        .await;

    let first = orchestrator(&answering);
    let second = orchestrator(&failing);
    let full = full_descriptor();
    let minimal = minimal_descriptor();

    let (ai, local) = tokio::join!(
        first.generate_outcome(&full, DATE),
        second.generate_outcome(&minimal, DATE),
    );
    let (ai, local) = (ai?, local?);

    assert!(ai.protocol.ai_generated);
    assert!(ai.fallback_reason.is_none());
    assert_eq!(ai.protocol.title, full.title);
    assert_eq!(ai.protocol.sections.len(), 3);

    assert!(!local.protocol.ai_generated);
    assert!(matches!(
        local.fallback_reason,
        Some(GenerationError::Status { status: 503, .. })
    ));
    assert_eq!(local.protocol.title, minimal.title);
    assert_eq!(local.protocol.sections, fallback_sections(&minimal));
    assert_ne!(ai.protocol.id, local.protocol.id);

    assert_eq!(answering.received_prompts().await.len(), 1);
    assert_eq!(failing.received_prompts().await.len(), 1);
    Ok(())
}
