//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use imgdepot_core::Config;
use imgdepot_ingest::UploadIngestor;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    // Setup the ingestor; this resolves and creates the storage directory
    let ingestor = UploadIngestor::new(
        config.storage_dir.clone(),
        config.max_file_size_bytes as u64,
        config.allowed_mime_prefixes.clone(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize upload ingestor: {}", e))?;

    tracing::info!(
        storage_dir = %config.storage_dir.display(),
        max_file_size_bytes = config.max_file_size_bytes,
        allowed_mime_prefixes = %config.allowed_mime_prefixes.join(","),
        "Upload ingestor ready"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        ingestor: Arc::new(ingestor),
    });

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
