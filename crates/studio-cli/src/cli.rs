//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use studio_extractor::{MAX_CHAR_BUFFER, MAX_PASSES, MAX_WORKERS};
use studio_llm::ProviderKind;

/// Extract Studio - structured extraction from unstructured text with LLMs.
#[derive(Debug, Parser)]
#[command(name = "studio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "EXTRACT_STUDIO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// Provider options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderArg {
    /// Google Gemini
    Gemini,
    /// OpenAI
    Openai,
    /// Local Ollama
    Ollama,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List presets or show one in full
    Presets(PresetsArgs),

    /// Run an extraction over one document
    Extract(ExtractArgs),

    /// Fill in an extraction task interactively
    Form,
}

/// Arguments for the presets command.
#[derive(Debug, Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    pub action: Option<PresetsAction>,
}

/// Preset actions.
#[derive(Debug, Subcommand)]
pub enum PresetsAction {
    /// Show the prompt, classes and examples of a preset
    Show {
        /// Preset identifier
        id: String,
    },
}

/// Arguments for the extract command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Start from a preset (character, medical, legal, feedback, knowledge_graph)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Extraction prompt; overrides the preset's
    #[arg(long)]
    pub prompt: Option<String>,

    /// Comma-separated extraction classes; overrides the preset's
    #[arg(long)]
    pub classes: Option<String>,

    /// JSON file with few-shot examples; replaces the preset's
    #[arg(short, long)]
    pub examples: Option<PathBuf>,

    /// Document text
    #[arg(long, conflicts_with_all = ["url", "file"])]
    pub text: Option<String>,

    /// Fetch the document from a URL
    #[arg(long, conflicts_with = "file")]
    pub url: Option<String>,

    /// Read the document from a .txt, .md or .csv file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Model backend
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Endpoint override (Ollama URL or API base URL)
    #[arg(long)]
    pub model_url: Option<String>,

    /// API key; defaults to the provider's environment variable
    #[arg(long)]
    pub api_key: Option<String>,

    /// Extraction passes
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=MAX_PASSES as i64))]
    pub passes: Option<u8>,

    /// Concurrent model calls
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=MAX_WORKERS as i64))]
    pub workers: Option<u8>,

    /// Maximum characters per chunk (0 sends the whole document)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_CHAR_BUFFER as i64))]
    pub chunk_size: Option<u32>,

    /// Only show extractions of this class (repeatable)
    #[arg(long = "class")]
    pub class_filter: Vec<String>,

    /// Directory results are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Identifier recorded with the results
    #[arg(long, default_value = "document")]
    pub document_id: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ProviderArg> for ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Gemini => ProviderKind::Gemini,
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Ollama => ProviderKind::Ollama,
        }
    }
}
