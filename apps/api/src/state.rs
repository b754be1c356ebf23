use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::matching::engine::AiEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// Gemini-backed or simulated; chosen once at startup.
    pub engine: AiEngine,
    pub config: Config,
}
