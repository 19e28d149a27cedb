//! LLM prompt engineering for few-shot extraction

use crate::types::{RawExtraction, ResponseEnvelope};
use studio_domain::ExampleData;

/// Builds the prompt sent for every chunk.
///
/// The preamble (instructions and examples) is rendered once; each chunk is
/// appended as the final question.
pub struct PromptBuilder {
    preamble: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(
        description: &str,
        classes: &[String],
        examples: &[ExampleData],
        fence_output: bool,
    ) -> Self {
        let mut preamble = String::new();

        // 1. Task description
        preamble.push_str(description.trim());
        preamble.push_str("\n\n");

        // 2. Allowed classes and output format
        preamble.push_str(&format!("Allowed extraction classes: {}\n\n", classes.join(", ")));
        preamble.push_str(FORMAT_INSTRUCTIONS);
        preamble.push_str("\n\n");

        // 3. Few-shot examples
        if !examples.is_empty() {
            preamble.push_str("Examples\n\n");
            for example in examples {
                preamble.push_str("Q: ");
                preamble.push_str(&example.text);
                preamble.push_str("\nA: ");
                preamble.push_str(&render_answer(example, fence_output));
                preamble.push_str("\n\n");
            }
        }

        Self { preamble }
    }

    /// Build the complete prompt for one chunk
    pub fn build(&self, chunk: &str) -> String {
        format!("{}Q: {}\nA: ", self.preamble, chunk)
    }
}

/// Expected answer for an example, in the same shape the model must return
fn render_answer(example: &ExampleData, fence_output: bool) -> String {
    let envelope = ResponseEnvelope {
        extractions: example
            .extractions
            .iter()
            .map(|e| RawExtraction {
                extraction_class: e.extraction_class.clone(),
                extraction_text: e.extraction_text.clone(),
                attributes: e.attributes.clone(),
            })
            .collect(),
    };
    // a struct of strings and string maps always serializes
    let json = serde_json::to_string_pretty(&envelope).unwrap_or_default();

    if fence_output {
        format!("```json\n{}\n```", json)
    } else {
        json
    }
}

const FORMAT_INSTRUCTIONS: &str = r#"Rules:
- Use exact text from the input for extraction_text. Do not paraphrase or overlap entities.
- List extractions in order of appearance.
- Only use the allowed extraction classes.
- Put supporting details in attributes as string values.

Respond with a JSON object of the form {"extractions": [{"extraction_class": "...", "extraction_text": "...", "attributes": {...}}]} and no additional text."#;

#[cfg(test)]
mod tests {
    use super::*;
    use studio_domain::Extraction;

    fn example() -> ExampleData {
        ExampleData::new(
            "Patient takes Lisinopril 10mg daily.",
            vec![Extraction::new("medication", "Lisinopril").with_attribute("dosage", "10mg")],
        )
    }

    fn classes() -> Vec<String> {
        vec!["medication".to_string(), "adverse_reaction".to_string()]
    }

    #[test]
    fn test_prompt_contains_all_parts() {
        let builder = PromptBuilder::new("Extract medications.", &classes(), &[example()], true);
        let prompt = builder.build("Started metformin 500mg.");

        assert!(prompt.starts_with("Extract medications."));
        assert!(prompt.contains("Allowed extraction classes: medication, adverse_reaction"));
        assert!(prompt.contains("Q: Patient takes Lisinopril 10mg daily."));
        assert!(prompt.contains("\"extraction_text\": \"Lisinopril\""));
        assert!(prompt.contains("\"dosage\": \"10mg\""));
        assert!(prompt.ends_with("Q: Started metformin 500mg.\nA: "));
    }

    #[test]
    fn test_fenced_answers() {
        let prompt = PromptBuilder::new("d", &classes(), &[example()], true).build("x");
        assert!(prompt.contains("A: ```json\n{"));
    }

    #[test]
    fn test_unfenced_answers() {
        let prompt = PromptBuilder::new("d", &classes(), &[example()], false).build("x");
        assert!(!prompt.contains("```"));
        assert!(prompt.contains("A: {"));
    }

    #[test]
    fn test_preamble_shared_between_chunks() {
        let builder = PromptBuilder::new("d", &classes(), &[example()], true);
        let a = builder.build("first");
        let b = builder.build("second");
        assert_eq!(a.strip_suffix("first\nA: "), b.strip_suffix("second\nA: "));
    }
}
