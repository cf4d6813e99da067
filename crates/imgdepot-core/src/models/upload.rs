//! Upload domain models

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use utoipa::ToSchema;

/// A successfully persisted upload.
///
/// Created once by the ingestor on a successful write and never mutated;
/// the file itself is owned by the filesystem from that point on.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    /// Collision-resistant name the file was stored under (`<uuid>.<ext>`).
    pub generated_name: String,
    /// Absolute location of the file on disk.
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
    /// Normalized declared MIME type (parameters stripped, lowercased).
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// JSON projection of a stored file returned by the upload endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Generated storage name, safe to persist as a reference.
    pub file_name: String,
    pub path: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<StoredFile> for UploadResponse {
    fn from(file: StoredFile) -> Self {
        UploadResponse {
            file_name: file.generated_name,
            path: file.absolute_path.display().to_string(),
            size_bytes: file.size_bytes,
            content_type: file.content_type,
            uploaded_at: file.uploaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_carries_stored_file_fields() {
        let stored = StoredFile {
            generated_name: "550e8400-e29b-41d4-a716-446655440000.jpg".to_string(),
            absolute_path: PathBuf::from("/var/lib/imgdepot/uploads")
                .join("550e8400-e29b-41d4-a716-446655440000.jpg"),
            size_bytes: 2_000_000,
            content_type: "image/jpeg".to_string(),
            uploaded_at: Utc::now(),
        };

        let response = UploadResponse::from(stored.clone());
        assert_eq!(response.file_name, stored.generated_name);
        assert!(response.path.ends_with(&stored.generated_name));
        assert_eq!(response.size_bytes, 2_000_000);

        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("file_name").and_then(|v| v.as_str()).is_some());
        assert!(json.get("path").and_then(|v| v.as_str()).is_some());
        assert_eq!(
            json.get("size_bytes").and_then(|v| v.as_u64()),
            Some(2_000_000)
        );
    }
}
