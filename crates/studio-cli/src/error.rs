//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error (missing key, out-of-range option, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown preset
    #[error("Configuration error: {0}")]
    Preset(#[from] studio_domain::PresetError),

    /// Input could not be obtained or is unusable
    #[error("Input error: {0}")]
    Input(String),

    /// Readiness checklist has failing items
    #[error("Not ready to run: {}", .0.join(", "))]
    NotReady(Vec<String>),

    /// Provider error
    #[error("Provider error: {0}")]
    Llm(#[from] studio_llm::LlmError),

    /// Extraction error
    #[error("Extraction failed: {0}")]
    Extraction(#[from] studio_extractor::ExtractorError),

    /// Output could not be written
    #[error("Output error: {0}")]
    Report(#[from] studio_report::ReportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
