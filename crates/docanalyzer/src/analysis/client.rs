use async_trait::async_trait;

use crate::error::AnalysisError;

/// Sends a prompt to a language model and returns the generated text.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}
