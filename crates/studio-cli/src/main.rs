//! Extract Studio CLI - front-end for LLM-based structured extraction.

use clap::Parser;
use studio_cli::commands;
use studio_cli::form;
use studio_cli::logging::init_tracing;
use studio_cli::{Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    init_tracing("info");

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> studio_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // API keys may live in .env
    let _ = dotenvy::dotenv();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        None | Some(Command::Form) => form::run_form(&config, &formatter).await?,
        Some(Command::Presets(args)) => commands::execute_presets(args, &formatter)?,
        Some(Command::Extract(args)) => commands::execute_extract(args, &config, &formatter).await?,
    }

    Ok(())
}
