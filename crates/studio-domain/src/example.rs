//! Few-shot examples

use crate::extraction::Extraction;
use serde::{Deserialize, Serialize};

/// A sample passage together with the extractions a model should produce for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleData {
    /// Source passage
    pub text: String,

    /// Expected extractions, in order of appearance
    pub extractions: Vec<Extraction>,
}

impl ExampleData {
    /// Create a new example
    pub fn new(text: impl Into<String>, extractions: Vec<Extraction>) -> Self {
        Self {
            text: text.into(),
            extractions,
        }
    }

    /// Extraction texts that do not occur verbatim in the passage
    pub fn missing_spans(&self) -> Vec<&str> {
        self.extractions
            .iter()
            .map(|e| e.extraction_text.as_str())
            .filter(|t| !self.text.contains(t))
            .collect()
    }

    /// Check that the example is usable as a few-shot demonstration.
    ///
    /// The passage must be non-empty, at least one extraction must be present
    /// and every extraction text must be an exact substring of the passage.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("example text is empty".to_string());
        }
        if self.extractions.is_empty() {
            return Err("example has no extractions".to_string());
        }
        if let Some(e) = self.extractions.iter().find(|e| e.extraction_class.trim().is_empty()) {
            return Err(format!("extraction '{}' has an empty class", e.extraction_text));
        }
        let missing = self.missing_spans();
        if !missing.is_empty() {
            return Err(format!(
                "not found verbatim in example text: {}",
                missing
                    .iter()
                    .map(|t| format!("'{}'", t))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        Ok(())
    }

    /// Short label for listings: first `max_chars` characters of the passage
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.text.chars().take(max_chars).collect();
        if self.text.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}
