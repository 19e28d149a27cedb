//! Annotated documents - source text plus its extractions

use crate::extraction::Extraction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A document together with the extractions found in it.
///
/// This is the native serialized form: one document per JSONL line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    /// Caller-chosen identifier (e.g. `note_001`)
    pub document_id: String,

    /// Full source text the offsets refer to
    pub text: String,

    /// Extractions in document order
    #[serde(default)]
    pub extractions: Vec<Extraction>,
}

impl AnnotatedDocument {
    /// Create a document with no extractions yet
    pub fn new(document_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            text: text.into(),
            extractions: Vec::new(),
        }
    }

    /// Attach extractions
    pub fn with_extractions(mut self, extractions: Vec<Extraction>) -> Self {
        self.extractions = extractions;
        self
    }

    /// Number of extractions per class
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for extraction in &self.extractions {
            *counts.entry(extraction.extraction_class.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Extractions whose class is in `classes`; all of them when `classes` is empty
    pub fn filtered<'a>(&'a self, classes: &'a [String]) -> impl Iterator<Item = &'a Extraction> + 'a {
        self.extractions
            .iter()
            .filter(move |e| classes.is_empty() || classes.contains(&e.extraction_class))
    }

    /// Number of extractions that were located in the text
    pub fn grounded_count(&self) -> usize {
        self.extractions.iter().filter(|e| e.is_grounded()).count()
    }
}
