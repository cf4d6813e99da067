//! Health check handler and response type.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
}

/// Health probe - process is running and the storage directory is reachable.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Storage directory unavailable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage_dir = state.ingestor.storage_dir();

    let (status, storage) = match tokio::fs::metadata(storage_dir).await {
        Ok(metadata) if metadata.is_dir() => (StatusCode::OK, "healthy".to_string()),
        Ok(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "not a directory".to_string(),
        ),
        // Missing is fine: the ingestor recreates the directory on the next write
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::OK, "healthy".to_string())
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("error: {}", e)),
    };

    (
        status,
        Json(HealthResponse {
            status: if status == StatusCode::OK {
                "ok".to_string()
            } else {
                "degraded".to_string()
            },
            storage,
        }),
    )
}
