//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error, surfaced verbatim
    #[error("LLM error: {0}")]
    Llm(String),

    /// Input document is empty or whitespace only
    #[error("Input document is empty")]
    EmptyDocument,

    /// A few-shot example is unusable
    #[error("Invalid example {index}: {reason}")]
    InvalidExample {
        /// 1-based position of the example
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Extraction timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// LLM response could not be interpreted
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
