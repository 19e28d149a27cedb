//! HTML visualisation of grounded extractions

use crate::error::ReportError;
use crate::io::write_file;
use askama::Template;
use std::collections::BTreeMap;
use std::path::Path;
use studio_domain::{AnnotatedDocument, Extraction};

/// Highlight colours, assigned to classes in sorted order
const PALETTE: &[&str] = &[
    "#ffd166", "#06d6a0", "#8ecae6", "#f4a3c0", "#cdb4db", "#ffb4a2", "#b5e48c", "#fcbf49",
    "#a0c4ff", "#e9c46a",
];

/// Run of source text, highlighted when it belongs to an extraction
struct Segment {
    /// Source text
    text: String,
    /// Whether the run is an extraction
    highlighted: bool,
    /// Background colour
    color: String,
    /// Hover text: class and attributes
    title: String,
}

/// Legend row
struct LegendEntry {
    /// Extraction class
    class: String,
    /// Background colour
    color: String,
    /// Extractions of this class
    count: usize,
}

/// Extraction listed below the text
struct EntityRow {
    /// Position in the document
    index: String,
    /// Extraction class
    class: String,
    /// Extracted text
    text: String,
    /// Character range, or `-` when ungrounded
    span: String,
    /// Alignment status, or `ungrounded`
    status: String,
    /// Attributes as `k=v, k=v`
    attributes: String,
}

#[derive(Template)]
#[template(path = "visualization.html")]
struct VisualizationTemplate<'a> {
    document_id: &'a str,
    total: usize,
    grounded: usize,
    segments: Vec<Segment>,
    legend: Vec<LegendEntry>,
    rows: Vec<EntityRow>,
}

/// Render `document` as a standalone HTML page.
///
/// Overlapping extractions are highlighted once; the later one still
/// appears in the table.
pub fn visualize(document: &AnnotatedDocument) -> Result<String, ReportError> {
    let colors: BTreeMap<String, &str> = document
        .class_counts()
        .into_keys()
        .enumerate()
        .map(|(i, class)| (class, PALETTE[i % PALETTE.len()]))
        .collect();

    let legend = document
        .class_counts()
        .into_iter()
        .map(|(class, count)| LegendEntry {
            color: colors[&class].to_string(),
            class,
            count,
        })
        .collect();

    let template = VisualizationTemplate {
        document_id: &document.document_id,
        total: document.extractions.len(),
        grounded: document.grounded_count(),
        segments: segments(document, &colors),
        legend,
        rows: document.extractions.iter().map(row).collect(),
    };
    Ok(template.render()?)
}

/// Render and write the page to `path`
pub fn write_visualization(path: &Path, document: &AnnotatedDocument) -> Result<(), ReportError> {
    write_file(path, &visualize(document)?)
}

fn segments(document: &AnnotatedDocument, colors: &BTreeMap<String, &str>) -> Vec<Segment> {
    let chars: Vec<char> = document.text.chars().collect();

    let mut grounded: Vec<&Extraction> = document
        .extractions
        .iter()
        .filter(|e| e.char_interval.is_some_and(|i| !i.is_empty() && i.end_pos <= chars.len()))
        .collect();
    grounded.sort_by_key(|e| e.char_interval.map(|i| (i.start_pos, i.end_pos)));

    let mut segments = Vec::new();
    let mut cursor = 0;
    for extraction in grounded {
        let Some(interval) = extraction.char_interval else {
            continue;
        };
        if interval.start_pos < cursor {
            continue;
        }
        if interval.start_pos > cursor {
            segments.push(plain(&chars[cursor..interval.start_pos]));
        }
        let mut title = extraction.extraction_class.clone();
        if !extraction.attributes.is_empty() {
            title.push_str(": ");
            title.push_str(&extraction.attributes_display());
        }
        segments.push(Segment {
            text: chars[interval.start_pos..interval.end_pos].iter().collect(),
            highlighted: true,
            color: colors
                .get(&extraction.extraction_class)
                .copied()
                .unwrap_or(PALETTE[0])
                .to_string(),
            title,
        });
        cursor = interval.end_pos;
    }
    if cursor < chars.len() {
        segments.push(plain(&chars[cursor..]));
    }
    segments
}

fn plain(chars: &[char]) -> Segment {
    Segment {
        text: chars.iter().collect(),
        highlighted: false,
        color: String::new(),
        title: String::new(),
    }
}

fn row(extraction: &Extraction) -> EntityRow {
    EntityRow {
        index: extraction
            .extraction_index
            .map_or_else(|| "-".to_string(), |i| i.to_string()),
        class: extraction.extraction_class.clone(),
        text: extraction.extraction_text.clone(),
        span: extraction
            .char_interval
            .map_or_else(|| "-".to_string(), |i| i.to_string()),
        status: extraction
            .alignment_status
            .map_or("ungrounded", |s| s.as_str())
            .to_string(),
        attributes: extraction.attributes_display(),
    }
}
