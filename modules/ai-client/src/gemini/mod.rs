mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::TextModel;
use client::GeminiClient;
use types::GenerateRequest;

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    base_url: Option<String>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// One generation call against one model, requesting a JSON response body.
    ///
    /// Extraction must be deterministic, so temperature is pinned to 0.
    pub async fn generate_json(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest::new(prompt).json_output().temperature(0.0);

        let response = self.client().generate(model, &request).await?;

        response
            .text()
            .ok_or_else(|| anyhow!("No text in Gemini response"))
    }
}

#[async_trait]
impl TextModel for Gemini {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.generate_json(model, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("test-key");
        assert_eq!(ai.api_key, "test-key");
        assert!(ai.base_url.is_none());
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("test-key").with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }
}
