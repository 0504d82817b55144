use anyhow::Result;

/// Primary extraction model when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Static fallback list tried, in order, after the primary model.
pub const FALLBACK_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

/// Application configuration loaded from environment variables.
///
/// Built once at process start and read-only thereafter.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // Server
    pub port: u16,

    // AI / LLM
    pub gemini_api_key: String,
    pub gemini_model: String,

    // Geocoding
    pub nominatim_base_url: Option<String>,

    // CORS
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            gemini_api_key: std::env::var("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            nominatim_base_url: std::env::var("NOMINATIM_BASE_URL").ok(),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }
}
