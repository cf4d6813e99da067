//! Domain models

pub mod upload;

pub use upload::{StoredFile, UploadResponse};
