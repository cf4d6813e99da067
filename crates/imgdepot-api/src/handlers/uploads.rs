//! Upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use imgdepot_core::models::UploadResponse;
use imgdepot_ingest::UploadRequest;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Upload file handler
///
/// Extracts the single "file" field from the multipart request and delegates
/// to the ingestor for validation and persistence.
///
/// # Errors
/// - `AppError::InvalidInput` - Missing file field or non-image MIME type
/// - `AppError::PayloadTooLarge` - File exceeds size limit
/// - `AppError::Storage` - Persistence failure
#[utoipa::path(
    post,
    path = "/api/v0/uploads",
    tag = "uploads",
    responses(
        (status = 201, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let (data, original_filename, declared_mime_type) = extract_multipart_file(multipart).await?;

    tracing::debug!(
        original_filename = %original_filename,
        declared_mime_type = %declared_mime_type,
        size_bytes = data.len(),
        "Processing upload"
    );

    let stored = state
        .ingestor
        .ingest(UploadRequest {
            original_filename,
            declared_mime_type,
            data,
        })
        .await
        .map_err(HttpAppError::from)?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(stored))))
}
