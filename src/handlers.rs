//! HTTP handlers module.
//!
//! Provides the topic clustering endpoint and a health check.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::TopicError;
use crate::models::{EmailInput, ErrorResponse, HealthResponse, TopicGroup};
use crate::services::TopicOrchestrator;

/// Application state shared across handlers.
pub struct AppState {
    pub orchestrator: Arc<TopicOrchestrator>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let orchestrator = Arc::new(TopicOrchestrator::new(&config));
        Self {
            orchestrator,
            config,
        }
    }
}

/// Build the HTTP router with middleware.
pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/health", get(health_check))
        .route("/cluster-topics", post(cluster_topics))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "email-topics".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        embedding_backend: state.orchestrator.backend().to_string(),
        model: state.orchestrator.model_name().to_string(),
        dimension: state.orchestrator.dimension(),
        endpoints: vec!["/health".to_string(), "/cluster-topics".to_string()],
    })
}

fn error_response(e: TopicError) -> (StatusCode, Json<ErrorResponse>) {
    (
        e.status_code(),
        Json(ErrorResponse {
            error: e.to_string(),
            code: Some(e.code().to_string()),
        }),
    )
}

/// Cluster a batch of emails into topics.
///
/// The body must be a JSON array; elements that are not email records are
/// kept as invalid entries and filtered out during validation.
pub async fn cluster_topics(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<Value>>, JsonRejection>,
) -> Result<Json<Vec<TopicGroup>>, (StatusCode, Json<ErrorResponse>)> {
    let Json(records) = payload.map_err(|rejection| {
        warn!("Rejected clustering request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            error_response(TopicError::PayloadTooLarge {
                limit: state.config.max_body_bytes,
            })
        } else {
            error_response(TopicError::NoData)
        }
    })?;
    let emails: Vec<EmailInput> = records.into_iter().map(EmailInput::from_json).collect();

    info!("📩 Received {} emails for clustering", emails.len());

    match state.orchestrator.cluster_emails(emails).await {
        Ok(groups) => Ok(Json(groups)),
        Err(e) => {
            if e.status_code().is_server_error() {
                error!("Clustering failed: {}", e);
            } else {
                warn!("Invalid clustering request: {}", e);
            }
            Err(error_response(e))
        }
    }
}
