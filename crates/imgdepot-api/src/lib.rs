//! Imgdepot API
//!
//! HTTP boundary for the upload ingestor: a multipart upload endpoint, health
//! probe, and OpenAPI docs. Exposed as a library so integration tests can
//! build the router without spawning the binary.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
