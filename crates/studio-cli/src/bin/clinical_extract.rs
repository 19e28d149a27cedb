//! Batch extraction over the embedded clinical notes.
//!
//! Writes the combined summary, one JSONL file per note and a visualisation
//! per note into `output/`.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use studio_cli::clinical::{require_api_key, run_clinical, API_KEY_VAR, CLINICAL_MODEL, CLINICAL_PASSES};
use studio_cli::config::OutputFormat;
use studio_cli::logging::init_tracing;
use studio_cli::Formatter;
use studio_extractor::{Extractor, ExtractorConfig};
use studio_llm::{Provider, ProviderKind, ProviderSettings};
use studio_report::io::list_files;

const OUTPUT_DIR: &str = "output";

#[derive(Parser, Debug)]
#[command(
    name = "clinical-extract",
    version,
    about = "Extract medical entities from the bundled clinical notes"
)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");
    Cli::parse();
    let _ = dotenvy::dotenv();

    let api_key = require_api_key(std::env::var(API_KEY_VAR).ok())?;
    let formatter = Formatter::new(OutputFormat::Table, std::io::stdout().is_terminal());

    let engine = ExtractorConfig::default().with_passes(CLINICAL_PASSES).with_workers(1);
    let provider = Provider::build(ProviderSettings {
        kind: ProviderKind::Gemini,
        model: CLINICAL_MODEL.to_string(),
        api_key: Some(api_key),
        model_url: None,
        timeout: engine.request_timeout(),
    })?;
    let extractor = Extractor::new(provider, engine);

    let output_dir = Path::new(OUTPUT_DIR);
    let result = run_clinical(&extractor, output_dir, &formatter).await?;

    let files = list_files(output_dir)?;
    println!();
    println!("{}", formatter.summary(&result, &files));

    Ok(())
}
