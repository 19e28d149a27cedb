//! Built-in presets - named bundles of prompt, classes and few-shot examples
//!
//! The table is fixed at compile time. Resolving an identifier is a pure
//! lookup with no side effects.

use crate::example::ExampleData;
use crate::extraction::Extraction;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from preset lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    /// Identifier is not one of the built-in presets
    #[error("Unknown preset: '{0}' (expected one of: character, medical, legal, feedback, knowledge_graph)")]
    UnknownPreset(String),
}

/// Identifier of a built-in preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PresetId {
    /// Characters and emotional states in literature
    Character,
    /// Medications and adverse reactions
    Medical,
    /// Parties, dates, obligations, amounts
    Legal,
    /// Product features and issues in reviews
    Feedback,
    /// Entities and relationships
    KnowledgeGraph,
}

impl PresetId {
    /// All presets in display order
    pub const ALL: [PresetId; 5] = [
        PresetId::Character,
        PresetId::Medical,
        PresetId::Legal,
        PresetId::Feedback,
        PresetId::KnowledgeGraph,
    ];

    /// Canonical identifier string
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetId::Character => "character",
            PresetId::Medical => "medical",
            PresetId::Legal => "legal",
            PresetId::Feedback => "feedback",
            PresetId::KnowledgeGraph => "knowledge_graph",
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetId {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        PresetId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// A named extraction configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    /// Identifier
    pub id: PresetId,

    /// Human-readable name
    pub display_name: String,

    /// Prompt description sent to the model
    pub prompt: String,

    /// Allowed extraction classes
    pub classes: Vec<String>,

    /// Few-shot examples
    pub examples: Vec<ExampleData>,
}

impl Preset {
    /// Resolve a preset from its identifier string
    ///
    /// # Examples
    ///
    /// ```
    /// use studio_domain::Preset;
    ///
    /// let preset = Preset::resolve("legal").unwrap();
    /// assert!(preset.classes.contains(&"party".to_string()));
    /// assert!(Preset::resolve("astrology").is_err());
    /// ```
    pub fn resolve(id: &str) -> Result<Self, PresetError> {
        id.parse::<PresetId>().map(Self::get)
    }

    /// Build the preset for a known identifier
    pub fn get(id: PresetId) -> Self {
        match id {
            PresetId::Character => character(),
            PresetId::Medical => medical(),
            PresetId::Legal => legal(),
            PresetId::Feedback => feedback(),
            PresetId::KnowledgeGraph => knowledge_graph(),
        }
    }

    /// Every preset, in display order
    pub fn all() -> Vec<Self> {
        PresetId::ALL.into_iter().map(Self::get).collect()
    }

    /// Classes as a comma-separated string
    pub fn classes_display(&self) -> String {
        self.classes.join(", ")
    }
}

fn classes(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn character() -> Preset {
    Preset {
        id: PresetId::Character,
        display_name: "Character Analysis (Literature)".to_string(),
        prompt: "Extract characters, their emotional states, and relationships in order of appearance."
            .to_string(),
        classes: classes(&["character"]),
        examples: vec![ExampleData::new(
            "ROMEO. But soft! What light through yonder window breaks? It is the east, and Juliet is the sun.",
            vec![
                Extraction::new("character", "ROMEO")
                    .with_attributes([("emotional_state", "wonder"), ("role", "protagonist")]),
                Extraction::new("character", "Juliet")
                    .with_attributes([("emotional_state", "referenced"), ("role", "love interest")]),
            ],
        )],
    }
}

fn medical() -> Preset {
    Preset {
        id: PresetId::Medical,
        display_name: "Medical / Clinical NER".to_string(),
        prompt: "Extract medications, dosages, routes of administration, and any adverse reactions mentioned."
            .to_string(),
        classes: classes(&["medication", "adverse_reaction"]),
        examples: vec![ExampleData::new(
            "Patient was prescribed Metformin 500mg orally twice daily. Reported mild nausea after first dose.",
            vec![
                Extraction::new("medication", "Metformin 500mg")
                    .with_attributes([("route", "oral"), ("frequency", "twice daily")]),
                Extraction::new("adverse_reaction", "mild nausea")
                    .with_attributes([("severity", "mild"), ("timing", "after first dose")]),
            ],
        )],
    }
}

fn legal() -> Preset {
    Preset {
        id: PresetId::Legal,
        display_name: "Legal Entity Extraction".to_string(),
        prompt: "Extract parties, dates, obligations, and monetary amounts from legal text.".to_string(),
        classes: classes(&["party", "date", "obligation", "amount"]),
        examples: vec![ExampleData::new(
            "ACME Corp agrees to pay Widget Inc $50,000 by December 31, 2025 for consulting services.",
            vec![
                Extraction::new("party", "ACME Corp").with_attribute("role", "payer"),
                Extraction::new("party", "Widget Inc").with_attribute("role", "payee"),
                Extraction::new("amount", "$50,000").with_attribute("currency", "USD"),
                Extraction::new("date", "December 31, 2025").with_attribute("type", "deadline"),
            ],
        )],
    }
}

fn feedback() -> Preset {
    Preset {
        id: PresetId::Feedback,
        display_name: "Customer Feedback Analysis".to_string(),
        prompt: "Extract sentiment, product features mentioned, and issues reported from customer reviews."
            .to_string(),
        classes: classes(&["feature", "issue"]),
        examples: vec![ExampleData::new(
            "Love the battery life on this phone! But the camera quality in low light is terrible and the app crashes frequently.",
            vec![
                Extraction::new("feature", "battery life").with_attribute("sentiment", "positive"),
                Extraction::new("issue", "camera quality in low light is terrible")
                    .with_attributes([("component", "camera"), ("severity", "major")]),
                Extraction::new("issue", "app crashes frequently")
                    .with_attributes([("component", "software"), ("severity", "major")]),
            ],
        )],
    }
}

fn knowledge_graph() -> Preset {
    Preset {
        id: PresetId::KnowledgeGraph,
        display_name: "Knowledge Graph Entities".to_string(),
        prompt: "Extract entities and their relationships to populate a knowledge graph. Include entity types and relationship labels."
            .to_string(),
        classes: classes(&["entity", "relationship"]),
        examples: vec![ExampleData::new(
            "Albert Einstein developed the theory of relativity while working at the Swiss Patent Office in Bern.",
            vec![
                Extraction::new("entity", "Albert Einstein")
                    .with_attributes([("type", "person"), ("role", "scientist")]),
                Extraction::new("entity", "theory of relativity").with_attribute("type", "scientific_theory"),
                Extraction::new("entity", "Swiss Patent Office")
                    .with_attributes([("type", "organization"), ("location", "Bern")]),
                Extraction::new("relationship", "developed").with_attributes([
                    ("subject", "Albert Einstein"),
                    ("object", "theory of relativity"),
                    ("type", "created"),
                ]),
            ],
        )],
    }
}
