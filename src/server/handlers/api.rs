//! API endpoint handlers.

use axum::{extract::State, response::IntoResponse, Json};

use super::super::AppState;
use super::types::{HealthResponse, OcrStatus};

/// Health check endpoint for container orchestration.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.pipeline.backend();

    Json(HealthResponse {
        status: "ok",
        ocr: OcrStatus {
            backend: backend.name(),
            available: backend.is_available(),
            hint: backend.availability_hint(),
        },
    })
}
