//! Extraction task state shared by the `extract` command and the form.

use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;
use studio_domain::{Attributes, ExampleData, Extraction, Preset, PresetId};
use studio_extractor::ExtractionRequest;

/// One line of the readiness checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessItem {
    /// What is checked
    pub label: &'static str,
    /// Whether the check passes
    pub ok: bool,
}

/// Labels of the failing items, empty when everything passes.
pub fn failing(items: &[ReadinessItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| !item.ok)
        .map(|item| item.label.to_string())
        .collect()
}

/// Prompt, classes, examples and input document for one extraction task.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// What to extract
    pub prompt: String,
    /// Classes the user declared
    pub classes: Vec<String>,
    /// Few-shot examples
    pub examples: Vec<ExampleData>,
    /// Input document text, once provided
    pub document: Option<String>,
    /// Preset the task was filled from
    pub loaded_preset: Option<PresetId>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace prompt, classes and examples with those of `preset`.
    pub fn load_preset(&mut self, preset: Preset) {
        self.prompt = preset.prompt;
        self.classes = preset.classes;
        self.examples = preset.examples;
        self.loaded_preset = Some(preset.id);
    }

    /// Set the class list from comma-separated text.
    pub fn set_classes(&mut self, csv: &str) {
        self.classes = parse_classes(csv);
    }

    /// Add an example after checking that every span is verbatim.
    pub fn add_example(&mut self, example: ExampleData) -> Result<()> {
        example
            .validate()
            .map_err(|reason| CliError::Input(format!("Invalid example: {}", reason)))?;
        if let Some(e) = example
            .extractions
            .iter()
            .find(|e| !self.classes.is_empty() && !self.classes.contains(&e.extraction_class))
        {
            return Err(CliError::Input(format!(
                "Class '{}' is not in the class list ({})",
                e.extraction_class,
                self.classes.join(", ")
            )));
        }
        self.examples.push(example);
        Ok(())
    }

    /// Remove the example at 1-based `position`.
    pub fn remove_example(&mut self, position: usize) -> Result<ExampleData> {
        if position == 0 || position > self.examples.len() {
            return Err(CliError::InvalidInput(format!(
                "No example {} (have {})",
                position,
                self.examples.len()
            )));
        }
        Ok(self.examples.remove(position - 1))
    }

    /// Remove every example.
    pub fn clear_examples(&mut self) {
        self.examples.clear();
        self.loaded_preset = None;
    }

    /// Whether a non-blank document has been provided.
    pub fn has_document(&self) -> bool {
        self.document.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// Readiness checklist, in display order.
    pub fn readiness(&self, has_api_key: bool) -> Vec<ReadinessItem> {
        vec![
            ReadinessItem {
                label: "API key configured",
                ok: has_api_key,
            },
            ReadinessItem {
                label: "Extraction prompt filled",
                ok: !self.prompt.trim().is_empty(),
            },
            ReadinessItem {
                label: "At least one few-shot example",
                ok: !self.examples.is_empty(),
            },
            ReadinessItem {
                label: "Input document provided",
                ok: self.has_document(),
            },
        ]
    }

    /// Allowed classes: the declared ones plus any used by the examples.
    pub fn allowed_classes(&self) -> Vec<String> {
        let mut classes = self.classes.clone();
        for extraction in self.examples.iter().flat_map(|e| &e.extractions) {
            if !classes.contains(&extraction.extraction_class) {
                classes.push(extraction.extraction_class.clone());
            }
        }
        classes
    }

    /// Build an engine request for the current document.
    pub fn to_request(&self, document_id: &str) -> Result<ExtractionRequest> {
        let document = self
            .document
            .clone()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| CliError::Input("Input document is empty".to_string()))?;

        Ok(
            ExtractionRequest::new(document_id, document, self.prompt.clone(), self.examples.clone())
                .with_classes(self.allowed_classes()),
        )
    }
}

/// Split comma-separated class names, dropping blanks.
pub fn parse_classes(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `key=value, key=value`; pairs without `=` are ignored.
pub fn parse_attributes(input: &str) -> Attributes {
    input
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Parse an example extraction line: `class | verbatim text | k=v, k=v`.
///
/// The attribute column is optional.
pub fn parse_extraction_line(line: &str) -> Result<Extraction> {
    let mut columns = line.splitn(3, '|').map(str::trim);
    let class = columns.next().unwrap_or_default();
    let text = columns.next().unwrap_or_default();
    let attributes = columns.next().map(parse_attributes).unwrap_or_default();

    if class.is_empty() || text.is_empty() {
        return Err(CliError::InvalidInput(
            "Expected 'class | verbatim text | key=value, ...'".to_string(),
        ));
    }
    Ok(Extraction::new(class, text).with_attributes(attributes))
}

/// Load examples from a JSON file holding an array of
/// `{"text": ..., "extractions": [...]}` objects.
pub fn load_examples_file(path: &Path) -> Result<Vec<ExampleData>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CliError::Input(format!("Cannot read {}: {}", path.display(), e)))?;
    let examples: Vec<ExampleData> = serde_json::from_str(&contents)?;
    Ok(examples)
}
