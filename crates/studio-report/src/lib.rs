//! Extract Studio Report Writer
//!
//! Aggregates per-document extraction results and writes them to disk:
//!
//! - a combined JSON file with per-document summaries and global counts
//! - one JSONL file per document in native [`AnnotatedDocument`] form
//! - an optional HTML page per document with highlighted extractions
//!
//! Count maps are ordered, so identical input produces byte-identical output.
//!
//! [`AnnotatedDocument`]: studio_domain::AnnotatedDocument

#![warn(missing_docs)]

mod aggregate;
mod error;
pub mod io;
mod visualize;

pub use aggregate::{entity_records, AggregateResult, Aggregator, DocumentSummary, EntityRecord};
pub use error::ReportError;
pub use visualize::{visualize, write_visualization};
