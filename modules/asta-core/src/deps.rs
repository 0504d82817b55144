use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::extractor::ListingExtractor;

/// Central dependency container passed to all handlers.
///
/// Constructed once at process start; everything inside is shared and
/// read-only for the life of the process.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub http_client: reqwest::Client,
    pub extractor: Arc<dyn ListingExtractor>,
    pub config: AppConfig,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        http_client: reqwest::Client,
        extractor: Arc<dyn ListingExtractor>,
        config: AppConfig,
    ) -> Self {
        Self {
            db_pool,
            http_client,
            extractor,
            config,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db_pool
    }
}
