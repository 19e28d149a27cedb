//! Extract Studio Domain Layer
//!
//! Core data model shared by every other crate in the workspace. Nothing in
//! here performs I/O; providers, the extraction engine and the report writer
//! all depend on these types.
//!
//! ## Key Concepts
//!
//! - **Extraction**: a typed span of text with attributes, optionally grounded
//!   to character offsets in its source document
//! - **ExampleData**: a few-shot passage with the extractions expected from it
//! - **AnnotatedDocument**: a source document plus its grounded extractions
//! - **Preset**: a named bundle of prompt, entity classes and examples
//!
//! ## Architecture
//!
//! Trait definitions for external interactions (LLM providers) live in
//! [`traits`]; implementations live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod example;
pub mod extraction;
pub mod preset;
pub mod traits;

// Re-exports for convenience
pub use document::AnnotatedDocument;
pub use example::ExampleData;
pub use extraction::{AlignmentStatus, Attributes, CharInterval, Extraction};
pub use preset::{Preset, PresetError, PresetId};
