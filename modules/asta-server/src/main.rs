use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod routes;
mod webhook;

use ai_client::{Gemini, ModelChain};
use asta_core::{config::FALLBACK_MODELS, AppConfig, ServerDeps};
use asta_domains::geo::{self, Nominatim};
use asta_domains::Extractor;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting asta-server");

    let config = AppConfig::from_env()?;
    let port = config.port;

    // Database pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    // HTTP client shared by the geocoder
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    // Extraction pipeline: Gemini behind the fallback chain, Nominatim
    // enrichment, Ghana bounds.
    let gemini = Gemini::new(&config.gemini_api_key);
    let chain = ModelChain::new(Arc::new(gemini), config.gemini_model.clone(), FALLBACK_MODELS);
    tracing::info!(models = ?chain.models(), "Model chain configured");

    let mut nominatim = Nominatim::new(http_client.clone());
    if let Some(ref url) = config.nominatim_base_url {
        nominatim = nominatim.with_base_url(url.clone());
    }

    let extractor = Arc::new(Extractor::new(chain, Arc::new(nominatim), geo::GHANA));

    let deps = Arc::new(ServerDeps::new(pool, http_client, extractor, config));

    let app = routes::build_router(deps);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
