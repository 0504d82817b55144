use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstaError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AstaError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}
