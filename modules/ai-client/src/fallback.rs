use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::traits::TextModel;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("all {attempted} models in the chain failed")]
    AllModelsExhausted { attempted: usize },
}

// =============================================================================
// ModelChain
// =============================================================================

/// Ordered list of model names tried in sequence until one succeeds.
///
/// The chain is deduplicated preserving first occurrence: a model named both
/// as primary and in the fallback list is attempted once, at its earliest
/// position. Each model gets exactly one attempt per call; a failure moves
/// straight to the next model.
#[derive(Clone)]
pub struct ModelChain {
    provider: Arc<dyn TextModel>,
    models: Vec<String>,
}

impl ModelChain {
    pub fn new(
        provider: Arc<dyn TextModel>,
        primary: impl Into<String>,
        fallbacks: &[&str],
    ) -> Self {
        let mut models = vec![primary.into()];
        for fallback in fallbacks {
            if !models.iter().any(|m| m.as_str() == *fallback) {
                models.push(fallback.to_string());
            }
        }
        Self { provider, models }
    }

    /// The deduplicated attempt order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Try each model in order, returning the first successful raw text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        for model in &self.models {
            match self.provider.generate(model, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(model = model.as_str(), error = %e, "Model attempt failed, trying next");
                }
            }
        }
        Err(ModelError::AllModelsExhausted {
            attempted: self.models.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    /// Scripted provider: fails for every model name in `failing`, records
    /// the order of attempts.
    struct ScriptedProvider {
        failing: Vec<&'static str>,
        attempts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(failing: &[&'static str]) -> Self {
            Self {
                failing: failing.to_vec(),
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextModel for ScriptedProvider {
        async fn generate(&self, model: &str, _prompt: &str) -> Result<String> {
            self.attempts.lock().unwrap().push(model.to_string());
            if self.failing.contains(&model) {
                Err(anyhow!("simulated upstream failure"))
            } else {
                Ok(format!("output from {model}"))
            }
        }
    }

    #[tokio::test]
    async fn first_success_wins() {
        let provider = Arc::new(ScriptedProvider::new(&[]));
        let chain = ModelChain::new(provider.clone(), "model-a", &["model-b"]);

        let out = chain.generate("prompt").await.unwrap();
        assert_eq!(out, "output from model-a");
        assert_eq!(provider.attempts(), vec!["model-a"]);
    }

    #[tokio::test]
    async fn falls_through_to_third_model() {
        let provider = Arc::new(ScriptedProvider::new(&["model-a", "model-b"]));
        let chain = ModelChain::new(provider.clone(), "model-a", &["model-b", "model-c"]);

        let out = chain.generate("prompt").await.unwrap();
        assert_eq!(out, "output from model-c");
        // A and B each attempted exactly once, in order.
        assert_eq!(provider.attempts(), vec!["model-a", "model-b", "model-c"]);
    }

    #[tokio::test]
    async fn exhaustion_when_every_model_fails() {
        let provider = Arc::new(ScriptedProvider::new(&["model-a", "model-b"]));
        let chain = ModelChain::new(provider.clone(), "model-a", &["model-b"]);

        let err = chain.generate("prompt").await.unwrap_err();
        assert!(matches!(err, ModelError::AllModelsExhausted { attempted: 2 }));
        assert_eq!(provider.attempts(), vec!["model-a", "model-b"]);
    }

    #[tokio::test]
    async fn duplicate_models_collapse_to_earliest_position() {
        let provider = Arc::new(ScriptedProvider::new(&["model-a"]));
        let chain = ModelChain::new(provider.clone(), "model-a", &["model-a", "model-b"]);

        assert_eq!(chain.models(), &["model-a", "model-b"]);

        let out = chain.generate("prompt").await.unwrap();
        assert_eq!(out, "output from model-b");
        // [A, A, B] behaves as [A, B]: A attempted once.
        assert_eq!(provider.attempts(), vec!["model-a", "model-b"]);
    }

    #[tokio::test]
    async fn primary_already_in_fallback_list_keeps_front_position() {
        let provider = Arc::new(ScriptedProvider::new(&[]));
        let chain = ModelChain::new(provider, "model-b", &["model-a", "model-b"]);
        assert_eq!(chain.models(), &["model-b", "model-a"]);
    }
}
