//! Extract Studio Extractor
//!
//! Turns unstructured text into grounded, typed extractions using an LLM.
//!
//! # Overview
//!
//! The caller supplies a prompt description, a list of allowed classes and a
//! few few-shot examples. The extractor prompts the model once per chunk and
//! pass, parses the JSON it returns, locates every extracted text in the
//! source and merges the passes into one ordered list.
//!
//! # Architecture
//!
//! ```text
//! Text → Chunker → Prompt → LLM → Parser → Aligner → Merge → AnnotatedDocument
//! ```
//!
//! # Key Features
//!
//! - **Source Grounding**: every extraction carries character offsets when its
//!   text can be found in the document
//! - **Schema Constraints**: a JSON schema built from the classes and example
//!   attributes is sent to providers that honour one
//! - **Chunking**: long documents are split on sentence boundaries
//! - **Multiple Passes**: later passes fill gaps left by earlier ones
//! - **Bounded Parallelism**: chunk calls run concurrently up to a worker limit
//!
//! # Example Usage
//!
//! ```no_run
//! use studio_extractor::{Extractor, ExtractorConfig, ExtractionRequest};
//! use studio_domain::{ExampleData, Extraction};
//! use studio_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"extractions": []}"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//!
//! let examples = vec![ExampleData::new(
//!     "Patient takes Lisinopril 10mg daily.",
//!     vec![Extraction::new("medication", "Lisinopril").with_attribute("dosage", "10mg")],
//! )];
//! let request = ExtractionRequest::new(
//!     "note_001",
//!     "Started metformin 500mg twice daily.",
//!     "Extract medications with their dosage.",
//!     examples,
//! );
//!
//! let result = extractor.extract(request).await?;
//! for extraction in &result.document.extractions {
//!     println!("{}: {}", extraction.extraction_class, extraction.extraction_text);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod aligner;
mod chunking;
mod config;
mod error;
mod extractor;
mod merge;
mod parser;
mod prompt;
mod schema;
mod types;

#[cfg(test)]
mod tests;

pub use chunking::{TextChunk, TextChunker};
pub use config::{ExtractorConfig, MAX_CHAR_BUFFER, MAX_PASSES, MAX_WORKERS};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use schema::response_schema;
pub use types::{ExtractionMetadata, ExtractionRequest, ExtractionResult};
