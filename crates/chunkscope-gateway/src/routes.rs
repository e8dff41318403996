//! API route handlers for the gateway.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chunkscope_core::error::ChunkScopeError;
use chunkscope_retrieval::{RetrievalRequest, RetrievalResponse};
use std::sync::Arc;

use super::server::AppState;

/// Error wrapper mapping each error kind onto an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub ChunkScopeError);

impl From<ChunkScopeError> for ApiError {
    fn from(e: ChunkScopeError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ChunkScopeError::Validation(_) => StatusCode::BAD_REQUEST,
            ChunkScopeError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            tracing::debug!("request rejected: {}", self.0);
        } else {
            tracing::error!("❌ {}", self.0);
        }
        let body = serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chunkscope-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Scoped keyword retrieval.
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<RetrievalResponse>, ApiError> {
    let Json(body) = body.map_err(|e| {
        ChunkScopeError::Validation(format!("invalid JSON body: {}", e.body_text()))
    })?;
    let request = RetrievalRequest::from_json(&body)?;
    let response = state.retrieval.retrieve(&request).await?;
    Ok(Json(response))
}

/// Corpus row counts.
pub async fn corpus_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = state.corpus.stats()?;
    Ok(Json(serde_json::json!({
        "stats": stats,
        "db_path": state.config.corpus.db_path,
        "limits": {
            "default": state.config.retrieval.default_limit,
            "max": state.config.retrieval.max_limit,
        },
        "uptime_secs": state.start_time.elapsed().as_secs(),
    })))
}
