//! Error types for report writing

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Error, Debug)]
pub enum ReportError {
    /// Output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A file could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Document id cannot name an output file
    #[error("Invalid document id '{id}': {reason}")]
    InvalidDocumentId {
        /// Offending id
        id: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Two documents share an id and would share an output file
    #[error("Duplicate document id '{0}'")]
    DuplicateDocumentId(String),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTML template failed to render
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}
