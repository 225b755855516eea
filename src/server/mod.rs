//! REST API server for protocol generation
//!
//! Routes:
//! - `GET  /api/health`
//! - `POST /api/analyze` - free-form research question
//! - `POST /api/generateProtocol` - raw model text for a protocol request
//! - `POST /api/protocols` - full pipeline, always yields a protocol for valid input
//! - `POST /api/templates` - data collection template for a protocol

use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::completion::CompletionClient;
use crate::protocol::{GenerationOrchestrator, PromptBuilder};

pub mod analyze;
mod handlers;

pub use analyze::{extract_insights, AnalysisReply};

/// Shared API state
pub struct ApiState {
    client: Arc<dyn CompletionClient>,
    orchestrator: GenerationOrchestrator,
    prompt_builder: PromptBuilder,
    timeout: Duration,
}

impl ApiState {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self {
            orchestrator: GenerationOrchestrator::new(Arc::clone(&client)).with_timeout(timeout),
            client,
            prompt_builder: PromptBuilder::new(),
            timeout,
        }
    }
}

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/generateProtocol", post(handlers::generate_protocol_text))
        .route("/api/protocols", post(handlers::create_protocol))
        .route("/api/templates", post(handlers::create_template))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process exits
pub async fn serve(addr: &str, state: ApiState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    info!("Starting protocol API server on {}", local);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Error body returned by every failing route
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// A failed request: status plus a `{error}` body
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn upstream(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
