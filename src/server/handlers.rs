use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::analyze::{analysis_prompt, extract_insights, AnalysisReply};
use super::{ApiError, ApiState};
use crate::completion::GenerationError;
use crate::protocol::{
    generate_template, today, DataTemplate, ExperimentDescriptor, PromptPair, Protocol,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub(super) struct HealthReply {
    status: &'static str,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateProtocolRequest {
    #[serde(default)]
    experiment_title: Option<String>,
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    methods: Option<String>,
    #[serde(default)]
    analysis_types: Option<Vec<String>>,
    #[serde(default)]
    file_content: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateProtocolReply {
    protocol: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing required field: {name}")))
}

pub(super) async fn health_check() -> Json<HealthReply> {
    Json(HealthReply { status: "ok" })
}

async fn complete_text(state: &ApiState, prompt: &PromptPair) -> Result<String, ApiError> {
    let result = tokio::time::timeout(state.timeout, state.client.complete(prompt))
        .await
        .map_err(|_| GenerationError::Timeout(state.timeout))
        .and_then(|inner| inner);

    match result {
        Ok(text) if !text.trim().is_empty() => Ok(text),
        Ok(_) => Err(ApiError::upstream(
            GenerationError::EmptyResponse.to_string(),
        )),
        Err(e) => {
            warn!("Completion request failed: {}", e);
            Err(ApiError::upstream(e.to_string()))
        }
    }
}

pub(super) async fn analyze(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<AnalysisReply> {
    let request = body(payload)?;
    let query = required(&request.query, "query")?;
    debug!("Analyzing research question ({} chars)", query.len());

    let answer = complete_text(&state, &analysis_prompt(query)).await?;
    let (insights, suggestions) = extract_insights(&answer);

    Ok(Json(AnalysisReply {
        result: answer,
        insights,
        suggestions,
    }))
}

pub(super) async fn generate_protocol_text(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<GenerateProtocolRequest>, JsonRejection>,
) -> ApiResult<GenerateProtocolReply> {
    let request = body(payload)?;
    let title = required(&request.experiment_title, "experimentTitle")?;
    let goal = required(&request.goal, "goal")?;
    let methods = required(&request.methods, "methods")?;

    let mut descriptor = ExperimentDescriptor::new(title)
        .with_purpose(goal)
        .with_design_rationale(methods)
        .with_analysis_types(request.analysis_types.unwrap_or_default());
    if let Some(content) = request.file_content {
        descriptor = descriptor.with_file_content(content);
    }

    let prompt = state.prompt_builder.build(&descriptor);
    let protocol = complete_text(&state, &prompt).await?;
    Ok(Json(GenerateProtocolReply { protocol }))
}

pub(super) async fn create_protocol(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Protocol> {
    let input = body(payload)?;
    let protocol = state
        .orchestrator
        .generate_from_value(&input, &today())
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(protocol))
}

pub(super) async fn create_template(
    payload: Result<Json<Protocol>, JsonRejection>,
) -> ApiResult<DataTemplate> {
    let protocol = body(payload)?;
    Ok(Json(generate_template(&protocol)))
}
