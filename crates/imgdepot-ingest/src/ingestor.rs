//! Upload ingestor
//!
//! Single component handling the upload-and-rename pipeline: validate the
//! declared MIME type and size, ensure the storage directory exists (race-safe
//! under concurrent first use), persist the bytes under a generated name, and
//! report the outcome.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use imgdepot_core::StoredFile;

use crate::filename;

/// Ingest operation errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// Declared MIME type does not match any allowed prefix.
    #[error("Only image files are allowed!")]
    UnsupportedMediaType { declared: String },

    #[error("File too large: {size} bytes exceeds maximum of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Persistence failed; also covers storage directory creation failure,
    /// since the effect (file not stored) is identical for the caller.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;

/// One incoming upload. Transient; consumed by [`UploadIngestor::ingest`].
#[derive(Debug)]
pub struct UploadRequest {
    pub original_filename: String,
    pub declared_mime_type: String,
    pub data: Vec<u8>,
}

/// Strip MIME parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg")
/// and lowercase for comparison.
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Upload ingestor over a fixed storage directory.
#[derive(Clone)]
pub struct UploadIngestor {
    storage_dir: PathBuf,
    max_file_size_bytes: u64,
    allowed_mime_prefixes: Vec<String>,
}

impl UploadIngestor {
    /// Create a new UploadIngestor.
    ///
    /// # Arguments
    /// * `storage_dir` - Fixed directory all uploads are written to
    ///   (e.g., "/var/lib/imgdepot/uploads"); created here if missing
    /// * `max_file_size_bytes` - Size ceiling; larger uploads are rejected
    /// * `allowed_mime_prefixes` - Lowercased MIME prefixes (e.g., "image/")
    pub async fn new(
        storage_dir: impl Into<PathBuf>,
        max_file_size_bytes: u64,
        allowed_mime_prefixes: Vec<String>,
    ) -> IngestResult<Self> {
        let ingestor = UploadIngestor {
            storage_dir: storage_dir.into(),
            max_file_size_bytes,
            allowed_mime_prefixes,
        };

        ingestor.ensure_storage_dir().await?;
        Ok(ingestor)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Ensure the storage directory exists.
    ///
    /// `create_dir_all` treats an already-existing directory as success, so
    /// concurrent first-time creation (in-process or across processes sharing
    /// the path) cannot fail a request.
    async fn ensure_storage_dir(&self) -> IngestResult<()> {
        fs::create_dir_all(&self.storage_dir).await.map_err(|e| {
            IngestError::WriteFailed(format!(
                "Failed to create storage directory {}: {}",
                self.storage_dir.display(),
                e
            ))
        })
    }

    /// Validate the declared MIME type against the allow-list prefixes.
    fn validate_mime_type(&self, declared: &str) -> IngestResult<String> {
        let normalized = normalize_mime_type(declared);
        if !self
            .allowed_mime_prefixes
            .iter()
            .any(|prefix| normalized.starts_with(prefix.as_str()))
        {
            return Err(IngestError::UnsupportedMediaType {
                declared: declared.to_string(),
            });
        }
        Ok(normalized)
    }

    fn validate_size(&self, size: u64) -> IngestResult<()> {
        if size > self.max_file_size_bytes {
            return Err(IngestError::FileTooLarge {
                size,
                max: self.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// Ingest one upload: validate, then persist under a generated name.
    ///
    /// Validation failures are returned before the filesystem is touched.
    /// On a write failure the partial file is removed best-effort.
    pub async fn ingest(&self, request: UploadRequest) -> IngestResult<StoredFile> {
        let content_type = self.validate_mime_type(&request.declared_mime_type)?;
        let size = request.data.len() as u64;
        self.validate_size(size)?;

        self.ensure_storage_dir().await?;

        let generated_name = filename::generated_name(&request.original_filename);
        let path = self.storage_dir.join(&generated_name);
        let start = std::time::Instant::now();

        if let Err(e) = self.write_file(&path, &request.data).await {
            let _ = fs::remove_file(&path).await;
            return Err(e);
        }

        tracing::info!(
            generated_name = %generated_name,
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload persisted"
        );

        Ok(StoredFile {
            generated_name,
            absolute_path: path,
            size_bytes: size,
            content_type,
            uploaded_at: Utc::now(),
        })
    }

    /// Ingest an upload from a reader (for large bodies).
    ///
    /// The size ceiling is enforced while copying; on overflow the partial
    /// file is removed and `FileTooLarge` is returned.
    pub async fn ingest_stream(
        &self,
        original_filename: &str,
        declared_mime_type: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> IngestResult<StoredFile> {
        let content_type = self.validate_mime_type(declared_mime_type)?;

        self.ensure_storage_dir().await?;

        let generated_name = filename::generated_name(original_filename);
        let path = self.storage_dir.join(&generated_name);
        let start = std::time::Instant::now();

        let mut file = match fs::File::create(&path).await {
            Ok(file) => file,
            Err(e) => {
                return Err(IngestError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut written: u64 = 0;
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(file);
                    let _ = fs::remove_file(&path).await;
                    return Err(IngestError::WriteFailed(format!(
                        "Failed to read upload stream: {}",
                        e
                    )));
                }
            };
            if n == 0 {
                break;
            }

            written += n as u64;
            if written > self.max_file_size_bytes {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(IngestError::FileTooLarge {
                    size: written,
                    max: self.max_file_size_bytes,
                });
            }

            if let Err(e) = file.write_all(&buf[..n]).await {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(IngestError::WriteFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        if let Err(e) = file.sync_all().await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(IngestError::WriteFailed(format!(
                "Failed to sync file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            generated_name = %generated_name,
            path = %path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stream persisted"
        );

        Ok(StoredFile {
            generated_name,
            absolute_path: path,
            size_bytes: written,
            content_type,
            uploaded_at: Utc::now(),
        })
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> IngestResult<()> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            IngestError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            IngestError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            IngestError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;
    use uuid::Uuid;

    async fn image_ingestor(dir: &Path) -> UploadIngestor {
        UploadIngestor::new(dir, 10 * 1024 * 1024, vec!["image/".to_string()])
            .await
            .unwrap()
    }

    fn request(filename: &str, content_type: &str, data: Vec<u8>) -> UploadRequest {
        UploadRequest {
            original_filename: filename.to_string(),
            declared_mime_type: content_type.to_string(),
            data,
        }
    }

    fn files_on_disk(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn ingest_persists_file_and_preserves_extension() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let stored = ingestor
            .ingest(request("photo.JPG", "image/jpeg", vec![0u8; 2_000_000]))
            .await
            .unwrap();

        let (stem, extension) = stored.generated_name.rsplit_once('.').unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
        assert_eq!(extension, "JPG");
        assert_eq!(stored.size_bytes, 2_000_000);
        assert_eq!(stored.content_type, "image/jpeg");

        let metadata = std::fs::metadata(&stored.absolute_path).unwrap();
        assert_eq!(metadata.len(), 2_000_000);
    }

    #[tokio::test]
    async fn ingest_rejects_non_image_without_touching_disk() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let result = ingestor
            .ingest(request("report.pdf", "application/pdf", b"%PDF-1.4".to_vec()))
            .await;

        match result {
            Err(IngestError::UnsupportedMediaType { declared }) => {
                assert_eq!(declared, "application/pdf");
            }
            other => panic!("expected UnsupportedMediaType, got {:?}", other.map(|s| s.generated_name)),
        }
        assert_eq!(
            IngestError::UnsupportedMediaType {
                declared: "application/pdf".to_string()
            }
            .to_string(),
            "Only image files are allowed!"
        );
        assert_eq!(files_on_disk(dir.path()), 0);
    }

    #[tokio::test]
    async fn ingest_rejects_oversize_without_touching_disk() {
        let dir = tempdir().unwrap();
        let ingestor = UploadIngestor::new(dir.path(), 1024, vec!["image/".to_string()])
            .await
            .unwrap();

        let result = ingestor
            .ingest(request("big.png", "image/png", vec![0u8; 2048]))
            .await;

        assert!(matches!(
            result,
            Err(IngestError::FileTooLarge { size: 2048, max: 1024 })
        ));
        assert_eq!(files_on_disk(dir.path()), 0);
    }

    #[tokio::test]
    async fn ingest_accepts_mime_parameters_and_mixed_case() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let stored = ingestor
            .ingest(request("a.png", "IMAGE/PNG; charset=utf-8", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn ingest_without_extension_stores_bare_uuid() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let stored = ingestor
            .ingest(request("photo", "image/png", vec![1, 2, 3]))
            .await
            .unwrap();
        assert!(Uuid::parse_str(&stored.generated_name).is_ok());
        assert!(stored.absolute_path.exists());
    }

    #[tokio::test]
    async fn ingest_recreates_storage_dir_when_removed() {
        let dir = tempdir().unwrap();
        let storage = dir.path().join("uploads");
        let ingestor = UploadIngestor::new(&storage, 1024, vec!["image/".to_string()])
            .await
            .unwrap();

        // directory disappears between requests; next ingest recreates it
        std::fs::remove_dir_all(&storage).unwrap();

        let stored = ingestor
            .ingest(request("a.png", "image/png", vec![0u8; 16]))
            .await
            .unwrap();
        assert!(stored.absolute_path.exists());
    }

    #[tokio::test]
    async fn ingest_behaves_identically_with_preexisting_dir() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let first = ingestor
            .ingest(request("a.png", "image/png", vec![0u8; 16]))
            .await
            .unwrap();
        let second = ingestor
            .ingest(request("a.png", "image/png", vec![0u8; 16]))
            .await
            .unwrap();

        assert_ne!(first.generated_name, second.generated_name);
        assert_eq!(files_on_disk(dir.path()), 2);
    }

    #[tokio::test]
    async fn concurrent_ingests_produce_unique_names() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..1000 {
            let ingestor = ingestor.clone();
            tasks.spawn(async move {
                ingestor
                    .ingest(request("photo.jpg", "image/jpeg", vec![0u8; 4]))
                    .await
                    .unwrap()
                    .generated_name
            });
        }

        let mut names = HashSet::new();
        while let Some(result) = tasks.join_next().await {
            let name = result.unwrap();
            assert!(name.ends_with(".jpg"));
            assert!(names.insert(name), "duplicate generated name");
        }

        assert_eq!(names.len(), 1000);
        assert_eq!(files_on_disk(dir.path()), 1000);
    }

    #[tokio::test]
    async fn two_concurrent_uploads_of_same_filename_both_succeed() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let (a, b) = tokio::join!(
            ingestor.ingest(request("photo.jpg", "image/jpeg", vec![1u8; 32])),
            ingestor.ingest(request("photo.jpg", "image/jpeg", vec![2u8; 32])),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a.generated_name, b.generated_name);
        assert!(a.absolute_path.exists());
        assert!(b.absolute_path.exists());
    }

    #[tokio::test]
    async fn ingest_stream_persists_content() {
        let dir = tempdir().unwrap();
        let ingestor = image_ingestor(dir.path()).await;

        let data = vec![7u8; 200_000];
        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> =
            Box::pin(std::io::Cursor::new(data.clone()));

        let stored = ingestor
            .ingest_stream("photo.png", "image/png", reader)
            .await
            .unwrap();

        assert_eq!(stored.size_bytes, data.len() as u64);
        let on_disk = std::fs::read(&stored.absolute_path).unwrap();
        assert_eq!(on_disk, data);
    }

    #[tokio::test]
    async fn ingest_stream_aborts_oversize_and_cleans_up() {
        let dir = tempdir().unwrap();
        let ingestor = UploadIngestor::new(dir.path(), 1024, vec!["image/".to_string()])
            .await
            .unwrap();

        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> =
            Box::pin(std::io::Cursor::new(vec![0u8; 8192]));

        let result = ingestor.ingest_stream("big.png", "image/png", reader).await;
        assert!(matches!(result, Err(IngestError::FileTooLarge { .. })));
        assert_eq!(files_on_disk(dir.path()), 0);
    }
}
