//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for `extraction_passes`
pub const MAX_PASSES: usize = 5;

/// Upper bound for `max_workers`
pub const MAX_WORKERS: usize = 20;

/// Upper bound for `max_char_buffer`
pub const MAX_CHAR_BUFFER: usize = 100_000;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Independent extraction passes over the document (1-5)
    pub extraction_passes: usize,

    /// Chunk calls allowed in flight at once (1-20)
    pub max_workers: usize,

    /// Chunk size in characters; 0 disables chunking
    pub max_char_buffer: usize,

    /// Wrap few-shot answers in ```json fences
    pub fence_output: bool,

    /// Send a JSON schema to providers that accept one
    pub use_schema_constraints: bool,

    /// Maximum time for a single model call (seconds)
    pub request_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Set the number of passes
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.extraction_passes = passes;
        self
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Set the chunk size (0 = no chunking)
    pub fn with_char_buffer(mut self, max_char_buffer: usize) -> Self {
        self.max_char_buffer = max_char_buffer;
        self
    }

    /// Set output fencing and schema use together, as they depend on the provider
    pub fn with_output_mode(mut self, fence_output: bool, use_schema_constraints: bool) -> Self {
        self.fence_output = fence_output;
        self.use_schema_constraints = use_schema_constraints;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_PASSES).contains(&self.extraction_passes) {
            return Err(format!(
                "extraction_passes must be between 1 and {} (got {})",
                MAX_PASSES, self.extraction_passes
            ));
        }
        if !(1..=MAX_WORKERS).contains(&self.max_workers) {
            return Err(format!(
                "max_workers must be between 1 and {} (got {})",
                MAX_WORKERS, self.max_workers
            ));
        }
        if self.max_char_buffer > MAX_CHAR_BUFFER {
            return Err(format!(
                "max_char_buffer must be between 0 and {} (got {})",
                MAX_CHAR_BUFFER, self.max_char_buffer
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Several passes over small chunks, for recall on long documents
    pub fn thorough() -> Self {
        Self {
            extraction_passes: 3,
            max_workers: 10,
            max_char_buffer: 1000,
            ..Default::default()
        }
    }

    /// One pass, whole document in a single call
    pub fn fast() -> Self {
        Self::default()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    /// Single pass, single worker, no chunking
    fn default() -> Self {
        Self {
            extraction_passes: 1,
            max_workers: 1,
            max_char_buffer: 0,
            fence_output: true,
            use_schema_constraints: true,
            request_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let config = ExtractorConfig::default()
            .with_passes(MAX_PASSES)
            .with_workers(MAX_WORKERS)
            .with_char_buffer(MAX_CHAR_BUFFER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_passes() {
        assert!(ExtractorConfig::default().with_passes(0).validate().is_err());
        assert!(ExtractorConfig::default().with_passes(6).validate().is_err());
    }

    #[test]
    fn test_invalid_workers() {
        assert!(ExtractorConfig::default().with_workers(0).validate().is_err());
        let err = ExtractorConfig::default().with_workers(21).validate().unwrap_err();
        assert!(err.contains("max_workers"));
    }

    #[test]
    fn test_invalid_char_buffer() {
        let config = ExtractorConfig::default().with_char_buffer(MAX_CHAR_BUFFER + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_named_configs_are_valid() {
        assert!(ExtractorConfig::thorough().validate().is_ok());
        assert!(ExtractorConfig::fast().validate().is_ok());
        assert!(ExtractorConfig::thorough().extraction_passes > ExtractorConfig::fast().extraction_passes);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default().with_passes(2).with_char_buffer(1500);
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("extraction_passes = 3").unwrap();
        assert_eq!(parsed.extraction_passes, 3);
        assert_eq!(parsed.max_workers, 1);
        assert!(parsed.fence_output);
    }
}
