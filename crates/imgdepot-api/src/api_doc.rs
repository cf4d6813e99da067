//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::handlers::health::HealthResponse;
use imgdepot_core::models::UploadResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "imgdepot API",
        version = "0.1.0",
        description = "File upload service: accepts multipart image uploads, stores them under collision-resistant generated names, and returns the stored location."
    ),
    paths(
        handlers::uploads::upload_file,
        handlers::health::health_check,
    ),
    components(schemas(UploadResponse, ErrorResponse, HealthResponse)),
    tags(
        (name = "uploads", description = "File upload endpoints"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
