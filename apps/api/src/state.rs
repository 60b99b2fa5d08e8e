use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::storage::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Tender and bid snapshots. Postgres in production, in-memory in tests.
    pub store: Arc<dyn DocumentStore>,
    pub s3: S3Client,
    pub config: Config,
    /// Registry, extractor and optional text generator, fixed at start-up.
    pub pipeline: Arc<Pipeline>,
}
