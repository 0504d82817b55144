use async_trait::async_trait;
use thiserror::Error;

use crate::types::NewProperty;

/// Terminal failures of the extraction pipeline. All are caught at the
/// transport boundary and converted to a failure response plus a log line;
/// none abort the process.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("every model in the fallback chain failed")]
    AllModelsExhausted,

    #[error("model returned a response that is not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("model returned an empty listing array")]
    EmptyResponse,
}

/// Dyn-compatible seam over the text-to-listing pipeline, so transport
/// handlers and tests can swap the real model-backed extractor for a fake.
#[async_trait]
pub trait ListingExtractor: Send + Sync {
    async fn extract(&self, raw_text: &str) -> Result<NewProperty, ExtractionError>;
}
