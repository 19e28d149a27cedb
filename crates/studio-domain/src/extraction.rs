//! Extraction module - a typed span pulled out of a document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute map attached to an extraction.
///
/// Ordered so that serialized output is stable across runs.
pub type Attributes = BTreeMap<String, String>;

/// Half-open character range `[start_pos, end_pos)` into the source text.
///
/// Positions count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharInterval {
    /// First character of the span
    pub start_pos: usize,

    /// One past the last character of the span
    pub end_pos: usize,
}

impl CharInterval {
    /// Create a new interval
    pub fn new(start_pos: usize, end_pos: usize) -> Self {
        Self { start_pos, end_pos }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end_pos.saturating_sub(self.start_pos)
    }

    /// Whether the interval covers no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shift the interval right by `offset` characters
    pub fn shifted(&self, offset: usize) -> Self {
        Self::new(self.start_pos + offset, self.end_pos + offset)
    }

    /// Whether two intervals share at least one character
    pub fn overlaps(&self, other: &CharInterval) -> bool {
        self.start_pos < other.end_pos && other.start_pos < self.end_pos
    }
}

impl fmt::Display for CharInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_pos, self.end_pos)
    }
}

/// How an extraction's text was located in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStatus {
    /// Text found verbatim
    MatchExact,

    /// Text found ignoring case
    MatchLesser,
}

impl AlignmentStatus {
    /// Stable string form used in tables and HTML
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentStatus::MatchExact => "match_exact",
            AlignmentStatus::MatchLesser => "match_lesser",
        }
    }
}

/// A single extracted entity.
///
/// `char_interval` and `alignment_status` are `None` until the extraction
/// has been grounded against its source text, and stay `None` when the text
/// could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Entity class (e.g. `medication`)
    pub extraction_class: String,

    /// Text as it appears in the source
    pub extraction_text: String,

    /// Character offsets in the source document
    #[serde(default)]
    pub char_interval: Option<CharInterval>,

    /// How the offsets were found
    #[serde(default)]
    pub alignment_status: Option<AlignmentStatus>,

    /// Position of this extraction within its document, starting at 1
    #[serde(default)]
    pub extraction_index: Option<usize>,

    /// Free-form key/value attributes
    #[serde(default)]
    pub attributes: Attributes,
}

impl Extraction {
    /// Create an ungrounded extraction without attributes
    pub fn new(extraction_class: impl Into<String>, extraction_text: impl Into<String>) -> Self {
        Self {
            extraction_class: extraction_class.into(),
            extraction_text: extraction_text.into(),
            char_interval: None,
            alignment_status: None,
            extraction_index: None,
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the attribute map in one go
    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Attach grounding information
    pub fn grounded(mut self, interval: CharInterval, status: AlignmentStatus) -> Self {
        self.char_interval = Some(interval);
        self.alignment_status = Some(status);
        self
    }

    /// Whether the extraction has been located in its source
    pub fn is_grounded(&self) -> bool {
        self.char_interval.is_some()
    }

    /// Attributes rendered as `k=v, k=v`
    pub fn attributes_display(&self) -> String {
        self.attributes
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
