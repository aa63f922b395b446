//! HTTP host for the guidance generation proxy.
//!
//! `POST /api/generate` takes `{ mood?, energy?, topic? }` and answers
//! `{ content }` or `{ error }`. The upstream credential never leaves the
//! server.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use stillwater_core::{GuidanceClient, GuidanceError, GuidanceRequest, GuidanceResponse};

#[derive(Clone)]
pub struct AppState {
    client: Arc<GuidanceClient>,
}

impl AppState {
    pub fn new(client: GuidanceClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    match generate_content(&state.client, &body).await {
        Ok(content) => (StatusCode::OK, Json(GuidanceResponse::Content { content })).into_response(),
        Err(e) => error_response(e),
    }
}

/// A missing credential is reported before the body is looked at.
async fn generate_content(client: &GuidanceClient, body: &[u8]) -> Result<String, GuidanceError> {
    client.api_key()?;
    let req = GuidanceRequest::from_json(body)?;
    client.generate(&req).await
}

/// Status and payload for a failed generation.
pub fn error_response(err: GuidanceError) -> Response {
    let (status, message) = match &err {
        GuidanceError::MissingCredential(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        GuidanceError::Upstream { status, body } => {
            tracing::warn!(status, "upstream rejected guidance request");
            (StatusCode::INTERNAL_SERVER_ERROR, body.clone())
        }
        GuidanceError::InvalidEndpoint(_) => {
            tracing::error!(error = %err, "guidance endpoint misconfigured");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        GuidanceError::BadRequest
        | GuidanceError::Transport(_)
        | GuidanceError::MalformedResponse(_) => {
            tracing::debug!(error = %err, "guidance request failed");
            (StatusCode::BAD_REQUEST, GuidanceError::BadRequest.to_string())
        }
    };
    (status, Json(GuidanceResponse::error(message))).into_response()
}
