//! JSON search API.
//!
//! ```text
//! GET /api/search?q=&mode=&limit=&weight=   - Ranked repositories
//! GET /api/status                           - Index status
//! GET /health                               - Liveness
//! ```

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use starsearch_config::SearchConfig;
use starsearch_protocols::{Candidate, ProtocolError, RetrievalError};
use starsearch_retrieval_hybrid::{EngineStatus, RetrievalEngine};

use crate::register::resolve_mode;

/// Shared handler state.
#[derive(Clone)]
pub(crate) struct ApiState {
    pub engine: Arc<RetrievalEngine>,
    pub search: Arc<SearchConfig>,
}

/// Query string of `GET /api/search`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub mode: Option<String>,
    pub limit: Option<usize>,
    pub weight: Option<f32>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    stage: &'static str,
}

/// Errors a handler can return.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error(transparent)]
    Request(#[from] ProtocolError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Request(_) => StatusCode::BAD_REQUEST,
            Self::Retrieval(RetrievalError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Retrieval(
                RetrievalError::EmbeddingUnavailable(_) | RetrievalError::RowStoreUnavailable(_),
            ) => StatusCode::BAD_GATEWAY,
            Self::Retrieval(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn stage(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Retrieval(e) => e.stage(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Search request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
            stage: self.stage(),
        };
        (status, Json(body)).into_response()
    }
}

/// Create the API router.
pub(crate) fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/status", get(status))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn search(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    let mode = resolve_mode(&state.search, params.mode.as_deref(), params.weight)?;
    let limit = state.search.effective_limit(params.limit);
    debug!("HTTP search: q={:?} mode={} limit={}", params.q, mode, limit);

    let results = state.engine.search(&params.q, mode, limit).await?;
    Ok(Json(results))
}

async fn status(State(state): State<ApiState>) -> Result<Json<EngineStatus>, ApiError> {
    Ok(Json(state.engine.status().await?))
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
