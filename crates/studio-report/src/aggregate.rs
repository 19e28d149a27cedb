//! Aggregating per-document results into combined output

use crate::error::ReportError;
use crate::io::{ensure_dir, write_json, write_jsonl};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use studio_domain::{AnnotatedDocument, Attributes, Extraction};
use tracing::info;

/// Flat view of one extraction for JSON export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    /// Extraction class
    pub class: String,
    /// Extracted text
    pub text: String,
    /// Attributes, empty when none were returned
    pub attributes: Attributes,
}

impl From<&Extraction> for EntityRecord {
    fn from(extraction: &Extraction) -> Self {
        Self {
            class: extraction.extraction_class.clone(),
            text: extraction.extraction_text.clone(),
            attributes: extraction.attributes.clone(),
        }
    }
}

/// Entity records for the extractions of `document` whose class is in
/// `classes` (all of them when `classes` is empty)
pub fn entity_records(document: &AnnotatedDocument, classes: &[String]) -> Vec<EntityRecord> {
    document.filtered(classes).map(EntityRecord::from).collect()
}

/// Structured summary of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    /// Document identifier
    pub document_id: String,
    /// Human-readable title
    pub title: String,
    /// Model that produced the extractions
    pub model: String,
    /// Number of extractions
    pub total_entities: usize,
    /// Extractions per class
    pub entities_by_class: BTreeMap<String, usize>,
    /// The extractions themselves
    pub entities: Vec<EntityRecord>,
}

impl DocumentSummary {
    /// Summarise an annotated document
    pub fn new(document: &AnnotatedDocument, title: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            document_id: document.document_id.clone(),
            title: title.into(),
            model: model.into(),
            total_entities: document.extractions.len(),
            entities_by_class: document.class_counts(),
            entities: entity_records(document, &[]),
        }
    }
}

/// Combined results of a run.
///
/// Built once by [`Aggregator::finish`] and not modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    total_documents: usize,
    total_entities: usize,
    entities_by_class: BTreeMap<String, usize>,
    documents: Vec<DocumentSummary>,
    #[serde(skip)]
    annotated: Vec<AnnotatedDocument>,
}

impl AggregateResult {
    /// Number of documents aggregated
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Extractions across all documents
    pub fn total_entities(&self) -> usize {
        self.total_entities
    }

    /// Extractions per class across all documents
    pub fn entities_by_class(&self) -> &BTreeMap<String, usize> {
        &self.entities_by_class
    }

    /// Per-document summaries in input order
    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    /// Annotated documents in input order
    pub fn annotated_documents(&self) -> &[AnnotatedDocument] {
        &self.annotated
    }

    /// Class counts ordered by descending count, then by class name
    pub fn counts_descending(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .entities_by_class
            .iter()
            .map(|(class, count)| (class.as_str(), *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts
    }

    /// Path of the JSONL file written for `document_id`
    pub fn jsonl_path(dir: &Path, document_id: &str) -> PathBuf {
        dir.join(format!("{}_extractions.jsonl", document_id))
    }

    /// Write the combined JSON file and one JSONL file per document.
    ///
    /// Creates `dir` if needed. Returns the paths written, combined file first.
    pub fn write(&self, dir: &Path, combined_name: &str) -> Result<Vec<PathBuf>, ReportError> {
        ensure_dir(dir)?;

        let combined = dir.join(combined_name);
        write_json(&combined, self)?;
        let mut written = vec![combined];

        for document in &self.annotated {
            let path = Self::jsonl_path(dir, &document.document_id);
            write_jsonl(&path, std::slice::from_ref(document))?;
            written.push(path);
        }

        info!(
            "Wrote {} file(s) for {} document(s) to {}",
            written.len(),
            self.total_documents,
            dir.display()
        );
        Ok(written)
    }
}

/// Collects per-document results and keeps a running count per class
#[derive(Debug, Default)]
pub struct Aggregator {
    documents: Vec<DocumentSummary>,
    annotated: Vec<AnnotatedDocument>,
    entities_by_class: BTreeMap<String, usize>,
}

impl Aggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document's results.
    ///
    /// The id names the document's JSONL file, so it must be unique within
    /// the run and usable as a plain file name.
    pub fn add(
        &mut self,
        document: AnnotatedDocument,
        title: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<&DocumentSummary, ReportError> {
        check_document_id(&document.document_id)?;
        if self.documents.iter().any(|d| d.document_id == document.document_id) {
            return Err(ReportError::DuplicateDocumentId(document.document_id));
        }

        let summary = DocumentSummary::new(&document, title, model);
        for (class, count) in &summary.entities_by_class {
            *self.entities_by_class.entry(class.clone()).or_insert(0) += count;
        }
        self.annotated.push(document);
        self.documents.push(summary);
        Ok(&self.documents[self.documents.len() - 1])
    }

    /// Number of documents added so far
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing has been added
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Freeze into an [`AggregateResult`]
    pub fn finish(self) -> AggregateResult {
        AggregateResult {
            total_documents: self.documents.len(),
            total_entities: self.documents.iter().map(|d| d.total_entities).sum(),
            entities_by_class: self.entities_by_class,
            documents: self.documents,
            annotated: self.annotated,
        }
    }
}

fn check_document_id(id: &str) -> Result<(), ReportError> {
    let reason = if id.trim().is_empty() {
        "empty"
    } else if id.contains(['/', '\\']) {
        "contains a path separator"
    } else if id.contains("..") {
        "contains '..'"
    } else {
        return Ok(());
    };
    Err(ReportError::InvalidDocumentId {
        id: id.to_string(),
        reason,
    })
}
