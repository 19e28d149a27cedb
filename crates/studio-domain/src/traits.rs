//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction engine and the
//! model backends. Implementations live in other crates.

use async_trait::async_trait;

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (studio-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Send;

    /// Generate a text completion
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate output constrained by a JSON schema (if supported).
    ///
    /// Providers without schema support fall back to their JSON mode or to
    /// plain generation.
    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;

    /// Model identifier used for reporting
    fn model_id(&self) -> &str;
}
