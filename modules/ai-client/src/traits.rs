use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// TextModel Trait
// =============================================================================

/// Dyn-compatible seam over a hosted generative-text provider.
///
/// One call = one attempt against one named model. Implementations must not
/// retry internally; retry policy belongs to [`crate::ModelChain`].
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate text from `prompt` using the named `model`.
    ///
    /// Returns the provider's raw text verbatim. Any transport, quota, or
    /// provider-side failure surfaces as an error.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}
