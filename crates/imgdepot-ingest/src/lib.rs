//! Imgdepot Ingest Library
//!
//! This crate provides the upload ingestor: it validates an uploaded file
//! (declared MIME type against an allow-list, size against a ceiling),
//! persists it under a collision-resistant generated name in a fixed storage
//! directory, and reports the stored file or a structured failure.
//!
//! # Generated name format
//!
//! Stored names are `<uuid-v4>.<extension>` where the extension is the
//! sanitized final dot-segment of the client filename (ASCII alphanumerics
//! only, case preserved), or a bare UUID when the filename carries no usable
//! extension. Names are never derived from client input, so concurrent
//! uploads of identically named files cannot collide and path traversal via
//! the filename is impossible.

pub(crate) mod filename;
pub mod ingestor;

// Re-export commonly used types
pub use ingestor::{IngestError, IngestResult, UploadIngestor, UploadRequest};
