//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::session::ReadinessItem;
use colored::*;
use std::path::PathBuf;
use studio_domain::{AnnotatedDocument, ExampleData, Extraction, Preset};
use studio_report::{entity_records, AggregateResult};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the extractions of `document` whose class is in `classes`
    /// (all when empty).
    pub fn format_extractions(&self, document: &AnnotatedDocument, classes: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&entity_records(document, classes))?),
            OutputFormat::Table => Ok(self.format_extractions_table(document, classes)),
        }
    }

    fn format_extractions_table(&self, document: &AnnotatedDocument, classes: &[String]) -> String {
        let extractions: Vec<&Extraction> = document.filtered(classes).collect();
        if extractions.is_empty() {
            return self.colorize("No extractions found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Class", "Text", "Span", "Attributes"]);

        for (i, extraction) in extractions.iter().enumerate() {
            let span = extraction
                .char_interval
                .map_or_else(|| "-".to_string(), |interval| interval.to_string());
            builder.push_record([
                (i + 1).to_string(),
                extraction.extraction_class.clone(),
                extraction.extraction_text.clone(),
                span,
                extraction.attributes_display(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the preset list.
    pub fn format_presets(&self, presets: &[Preset]) -> Result<String> {
        if self.format == OutputFormat::Json {
            let json: Vec<serde_json::Value> = presets
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "id": p.id.as_str(),
                        "name": p.display_name,
                        "classes": p.classes,
                        "examples": p.examples.len(),
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&json)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Name", "Classes", "Examples"]);
        for preset in presets {
            builder.push_record([
                preset.id.to_string(),
                preset.display_name.clone(),
                preset.classes_display(),
                preset.examples.len().to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format one preset in full.
    pub fn format_preset(&self, preset: &Preset) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(&serde_json::json!({
                "id": preset.id.as_str(),
                "name": preset.display_name,
                "prompt": preset.prompt,
                "classes": preset.classes,
                "examples": preset.examples,
            }))?);
        }

        let mut out = String::new();
        out.push_str(&self.colorize(&format!("{} ({})", preset.display_name, preset.id), "cyan"));
        out.push_str("\n\nPrompt:\n  ");
        out.push_str(&preset.prompt);
        out.push_str("\n\nClasses: ");
        out.push_str(&preset.classes_display());
        out.push_str("\n\n");
        out.push_str(&self.format_examples(&preset.examples));
        Ok(out)
    }

    /// Format few-shot examples with their extraction lines.
    pub fn format_examples(&self, examples: &[ExampleData]) -> String {
        if examples.is_empty() {
            return self.colorize("No examples.", "yellow");
        }

        let mut out = format!("Examples ({}):\n", examples.len());
        for (i, example) in examples.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, example.preview(80)));
            for extraction in &example.extractions {
                out.push_str("       ");
                out.push_str(&extraction_line(extraction));
                out.push('\n');
            }
        }
        out
    }

    /// Format run metrics: total and per class.
    pub fn metrics(&self, document: &AnnotatedDocument) -> String {
        let counts = document.class_counts();
        let mut out = self.colorize(
            &format!(
                "Total extractions: {} ({} grounded)",
                document.extractions.len(),
                document.grounded_count()
            ),
            "cyan",
        );
        for (class, count) in counts {
            out.push_str(&format!("\n  {:<20} {}", class, count));
        }
        out
    }

    /// Format the readiness checklist.
    pub fn checklist(&self, items: &[ReadinessItem]) -> String {
        items
            .iter()
            .map(|item| {
                if item.ok {
                    self.success(item.label)
                } else {
                    self.error(item.label)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format one extraction as it is reported during a batch run.
    pub fn entity_line(&self, extraction: &Extraction) -> String {
        let class = format!("[{:<20}]", extraction.extraction_class);
        let mut line = format!("  {} {}", self.colorize(&class, "magenta"), extraction.extraction_text);
        if !extraction.attributes.is_empty() {
            line.push_str(" | ");
            line.push_str(&extraction.attributes_display());
        }
        line
    }

    /// Format the end-of-run summary: totals, counts and written files.
    pub fn summary(&self, result: &AggregateResult, files: &[(PathBuf, u64)]) -> String {
        let mut out = self.colorize("Summary", "cyan");
        out.push_str(&format!("\n  Documents processed: {}", result.total_documents()));
        out.push_str(&format!("\n  Total entities:      {}", result.total_entities()));

        if !result.entities_by_class().is_empty() {
            out.push_str("\n\n  Entities by class:");
            for (class, count) in result.counts_descending() {
                out.push_str(&format!("\n    {:<20} {}", class, count));
            }
        }

        if !files.is_empty() {
            out.push_str("\n\n  Output files:");
            for (path, size) in files {
                let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                out.push_str(&format!("\n    {:<40} {:>8} bytes", name, size));
            }
        }
        out
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render an extraction as `class | text | k=v, k=v`, the form the
/// interactive form accepts.
pub fn extraction_line(extraction: &Extraction) -> String {
    if extraction.attributes.is_empty() {
        format!("{} | {}", extraction.extraction_class, extraction.extraction_text)
    } else {
        format!(
            "{} | {} | {}",
            extraction.extraction_class,
            extraction.extraction_text,
            extraction.attributes_display()
        )
    }
}
