//! Shared application state.

use std::sync::Arc;

use imgdepot_core::Config;
use imgdepot_ingest::UploadIngestor;

/// State shared by all handlers.
pub struct AppState {
    pub config: Config,
    pub ingestor: Arc<UploadIngestor>,
}
