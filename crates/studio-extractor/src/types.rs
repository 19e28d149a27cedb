//! Request and response types for extraction

use serde::{Deserialize, Serialize};
use studio_domain::{AnnotatedDocument, ExampleData};

/// Request to extract entities from one document
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Identifier carried through to the annotated document
    pub document_id: String,

    /// Document text
    pub text: String,

    /// What to extract, in plain language
    pub prompt_description: String,

    /// Few-shot examples
    pub examples: Vec<ExampleData>,

    /// Allowed classes; derived from the examples when empty
    pub classes: Vec<String>,
}

impl ExtractionRequest {
    /// Create a request with classes derived from the examples
    pub fn new(
        document_id: impl Into<String>,
        text: impl Into<String>,
        prompt_description: impl Into<String>,
        examples: Vec<ExampleData>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            text: text.into(),
            prompt_description: prompt_description.into(),
            examples,
            classes: Vec::new(),
        }
    }

    /// Restrict output to the given classes
    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = classes;
        self
    }

    /// Allowed classes: the explicit list, or every class used in the examples
    pub fn allowed_classes(&self) -> Vec<String> {
        if !self.classes.is_empty() {
            return self.classes.clone();
        }
        let mut classes: Vec<String> = Vec::new();
        for extraction in self.examples.iter().flat_map(|e| &e.extractions) {
            if !classes.contains(&extraction.extraction_class) {
                classes.push(extraction.extraction_class.clone());
            }
        }
        classes
    }
}

/// Result of an extraction operation
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The document with grounded extractions
    pub document: AnnotatedDocument,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction operation
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    /// Document identifier
    pub document_id: String,

    /// Model that produced the extractions
    pub model_id: String,

    /// Passes run
    pub passes: usize,

    /// Chunks the document was split into
    pub chunks: usize,

    /// Items parsed from model output across all passes
    pub candidates: usize,

    /// Items discarded (malformed or outside the allowed classes)
    pub dropped: usize,

    /// Extractions that could not be located in the text
    pub ungrounded: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Wire form of an extraction in model input and output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RawExtraction {
    pub extraction_class: String,
    pub extraction_text: String,
    #[serde(default)]
    pub attributes: studio_domain::Attributes,
}

/// Top-level object the model is asked to return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ResponseEnvelope {
    pub extractions: Vec<RawExtraction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_domain::Extraction;

    #[test]
    fn test_allowed_classes_from_examples() {
        let examples = vec![ExampleData::new(
            "ACME pays Widget $5",
            vec![
                Extraction::new("party", "ACME"),
                Extraction::new("party", "Widget"),
                Extraction::new("amount", "$5"),
            ],
        )];
        let request = ExtractionRequest::new("d", "text", "prompt", examples);
        assert_eq!(request.allowed_classes(), vec!["party", "amount"]);
    }

    #[test]
    fn test_explicit_classes_win() {
        let request = ExtractionRequest::new("d", "text", "prompt", vec![])
            .with_classes(vec!["issue".to_string()]);
        assert_eq!(request.allowed_classes(), vec!["issue"]);
    }
}
