//! Extract command implementation.

use crate::backend::Backend;
use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::input::InputSource;
use crate::output::Formatter;
use crate::session::{self, failing, Session};
use std::path::{Path, PathBuf};
use studio_domain::{AnnotatedDocument, Preset};
use studio_extractor::{Extractor, ExtractorConfig};
use studio_llm::Provider;
use studio_report::io::{ensure_dir, write_json, write_jsonl};
use studio_report::{entity_records, write_visualization};
use tracing::{info, warn};

/// Result list written by a front-end run
pub const RESULTS_JSON: &str = "langextract_results.json";
/// Native annotated document written by a front-end run
pub const RESULTS_JSONL: &str = "langextract_results.jsonl";
/// Highlighted document written by a front-end run
pub const VISUALIZATION_HTML: &str = "langextract_visualization.html";

/// Everything a run needs besides the task and the provider.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Engine options, already narrowed to the provider
    pub engine: ExtractorConfig,
    /// Directory results are written to
    pub output_dir: PathBuf,
    /// Classes shown in the result list; all when empty
    pub class_filter: Vec<String>,
    /// Identifier recorded with the results
    pub document_id: String,
}

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut session = Session::new();
    if let Some(id) = &args.preset {
        session.load_preset(Preset::resolve(id)?);
    }
    if let Some(prompt) = args.prompt {
        session.prompt = prompt;
    }
    if let Some(classes) = &args.classes {
        session.set_classes(classes);
    }
    if let Some(path) = &args.examples {
        session.examples.clear();
        for example in session::load_examples_file(path)? {
            session.add_example(example)?;
        }
    }

    if let Some(source) = InputSource::from_args(args.text, args.url, args.file) {
        println!("{}", formatter.info(&format!("Loading document from {}", source.describe())));
        session.document = Some(source.load().await?);
    }

    let mut backend = Backend::from_config(config);
    if let Some(provider) = args.provider {
        backend.set_kind(provider.into());
    }
    if args.model.is_some() {
        backend.model = args.model;
    }
    if args.model_url.is_some() {
        backend.model_url = args.model_url;
    }
    backend.api_key = args.api_key;

    let mut engine = config.extraction.clone();
    if let Some(passes) = args.passes {
        engine = engine.with_passes(passes.into());
    }
    if let Some(workers) = args.workers {
        engine = engine.with_workers(workers.into());
    }
    if let Some(chunk_size) = args.chunk_size {
        engine = engine.with_char_buffer(chunk_size as usize);
    }

    let options = RunOptions {
        engine: backend.engine_config(&engine),
        output_dir: args.output_dir.unwrap_or_else(|| config.settings.output_dir.clone()),
        class_filter: args.class_filter,
        document_id: args.document_id,
    };

    ensure_ready(&session, &backend, formatter)?;
    let provider = Provider::build(backend.settings(&options.engine))?;
    run_extraction(&session, provider, &options, formatter).await?;
    Ok(())
}

/// Print the readiness checklist and fail when any item is unmet.
pub fn ensure_ready(session: &Session, backend: &Backend, formatter: &Formatter) -> Result<()> {
    let items = session.readiness(backend.has_api_key());
    println!("{}", formatter.checklist(&items));
    println!();

    let missing = failing(&items);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::NotReady(missing))
    }
}

/// Run the task, show metrics and the result list, and write the output files.
pub async fn run_extraction(
    session: &Session,
    provider: Provider,
    options: &RunOptions,
    formatter: &Formatter,
) -> Result<AnnotatedDocument> {
    options.engine.validate().map_err(CliError::Config)?;
    let request = session.to_request(&options.document_id)?;

    let extractor = Extractor::new(provider, options.engine.clone());
    println!(
        "{}",
        formatter.info(&format!(
            "Extracting with {} ({} pass(es), {} worker(s))",
            extractor.model_id(),
            options.engine.extraction_passes,
            options.engine.max_workers
        ))
    );

    let result = extractor.extract(request).await?;
    info!(
        document_id = %result.metadata.document_id,
        extractions = result.document.extractions.len(),
        elapsed_ms = result.metadata.processing_time_ms,
        "Extraction finished"
    );

    println!("{}", formatter.metrics(&result.document));
    println!();
    println!("{}", formatter.format_extractions(&result.document, &options.class_filter)?);

    for path in write_outputs(&options.output_dir, &result.document)? {
        println!("{}", formatter.success(&format!("Wrote {}", path.display())));
    }

    Ok(result.document)
}

/// Write the result list, the annotated document and its visualisation.
///
/// A visualisation failure is logged and skipped.
pub fn write_outputs(dir: &Path, document: &AnnotatedDocument) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;

    let json_path = dir.join(RESULTS_JSON);
    write_json(&json_path, &entity_records(document, &[]))?;

    let jsonl_path = dir.join(RESULTS_JSONL);
    write_jsonl(&jsonl_path, std::slice::from_ref(document))?;

    let mut written = vec![json_path, jsonl_path];

    let html_path = dir.join(VISUALIZATION_HTML);
    match write_visualization(&html_path, document) {
        Ok(()) => written.push(html_path),
        Err(e) => warn!(error = %e, "Skipping visualization"),
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use studio_domain::PresetId;
    use studio_llm::MockProvider;
    use studio_report::io::read_jsonl;

    fn formatter() -> Formatter {
        Formatter::new(OutputFormat::Table, false)
    }

    fn options(dir: &Path) -> RunOptions {
        RunOptions {
            engine: ExtractorConfig::default(),
            output_dir: dir.to_path_buf(),
            class_filter: vec![],
            document_id: "review_1".to_string(),
        }
    }

    fn review_session() -> Session {
        let mut session = Session::new();
        session.load_preset(Preset::get(PresetId::Feedback));
        session.document = Some("Love the camera. Battery drains fast.".to_string());
        session
    }

    #[tokio::test]
    async fn test_run_extraction_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Provider::Mock(MockProvider::new(
            r#"{"extractions": [
                {"extraction_class": "feature", "extraction_text": "camera", "attributes": {"sentiment": "positive"}},
                {"extraction_class": "issue", "extraction_text": "Battery drains fast"}
            ]}"#,
        ));

        let document = run_extraction(&review_session(), provider, &options(dir.path()), &formatter())
            .await
            .unwrap();

        assert_eq!(document.document_id, "review_1");
        assert_eq!(document.extractions.len(), 2);
        assert_eq!(document.grounded_count(), 2);

        let records: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(RESULTS_JSON)).unwrap()).unwrap();
        assert_eq!(records[0]["class"], "feature");
        assert_eq!(records[0]["attributes"]["sentiment"], "positive");

        let parsed = read_jsonl(&dir.path().join(RESULTS_JSONL)).unwrap();
        assert_eq!(parsed, vec![document]);
        assert!(dir.path().join(VISUALIZATION_HTML).exists());
    }

    #[tokio::test]
    async fn test_run_extraction_surfaces_provider_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Provider::Mock(MockProvider::new("ERROR"));

        let result = run_extraction(&review_session(), provider, &options(dir.path()), &formatter()).await;
        assert!(matches!(result, Err(CliError::Extraction(_))));
        assert!(!dir.path().join(RESULTS_JSON).exists());
    }

    #[test]
    fn test_not_ready_without_document() {
        let mut session = review_session();
        session.document = None;
        let mut backend = Backend::from_config(&Config::default());
        backend.api_key = Some("key".to_string());

        match ensure_ready(&session, &backend, &formatter()) {
            Err(CliError::NotReady(missing)) => assert_eq!(missing, vec!["Input document provided"]),
            other => panic!("Expected NotReady, got {:?}", other),
        }
    }

    #[test]
    fn test_ready() {
        let mut backend = Backend::from_config(&Config::default());
        backend.api_key = Some("key".to_string());
        assert!(ensure_ready(&review_session(), &backend, &formatter()).is_ok());
    }

    #[test]
    fn test_write_outputs_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("results");
        let document = AnnotatedDocument::new("d", "text");

        let written = write_outputs(&out, &document).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(std::fs::read_to_string(out.join(RESULTS_JSON)).unwrap().trim(), "[]");
    }
}
