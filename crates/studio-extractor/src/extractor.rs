//! Core Extractor implementation

use crate::aligner::Aligner;
use crate::chunking::{TextChunk, TextChunker};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::merge::merge_passes;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use crate::schema::response_schema;
use crate::types::{ExtractionMetadata, ExtractionRequest, ExtractionResult};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use studio_domain::traits::LlmProvider;
use studio_domain::{AnnotatedDocument, Extraction};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns a document into grounded extractions
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
}

/// Outcome of one pass over every chunk
#[derive(Default)]
struct PassOutput {
    extractions: Vec<Extraction>,
    candidates: usize,
    dropped: usize,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self::with_shared_provider(Arc::new(llm_provider), config)
    }

    /// Create an Extractor over a provider that is also used elsewhere
    pub fn with_shared_provider(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Engine options in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Model identifier reported by the provider
    pub fn model_id(&self) -> &str {
        self.llm_provider.model_id()
    }

    /// Extract grounded entities from one document
    pub async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractorError> {
        let start_time = Instant::now();

        self.validate_request(&request)?;

        let classes = request.allowed_classes();
        let chunks = TextChunker::new(self.config.max_char_buffer).chunk(&request.text);
        let prompt_builder = PromptBuilder::new(
            &request.prompt_description,
            &classes,
            &request.examples,
            self.config.fence_output,
        );
        let schema = self
            .config
            .use_schema_constraints
            .then(|| response_schema(&classes, &request.examples).to_string());

        info!(
            "Starting extraction for '{}': {} chars, {} chunk(s), {} pass(es), model {}",
            request.document_id,
            request.text.chars().count(),
            chunks.len(),
            self.config.extraction_passes,
            self.model_id()
        );

        let mut passes = Vec::with_capacity(self.config.extraction_passes);
        let mut candidates = 0;
        let mut dropped = 0;

        for pass in 1..=self.config.extraction_passes {
            let output = self
                .run_pass(pass, &chunks, &prompt_builder, schema.as_deref(), &classes)
                .await?;
            info!(
                "Pass {}: {} extraction(s), {} dropped",
                pass,
                output.extractions.len(),
                output.dropped
            );
            candidates += output.candidates;
            dropped += output.dropped;
            passes.push(output.extractions);
        }

        let extractions = merge_passes(passes);
        let ungrounded = extractions.iter().filter(|e| !e.is_grounded()).count();
        if ungrounded > 0 {
            warn!(
                "{} extraction(s) in '{}' could not be located in the text",
                ungrounded, request.document_id
            );
        }

        let metadata = ExtractionMetadata {
            document_id: request.document_id.clone(),
            model_id: self.model_id().to_string(),
            passes: self.config.extraction_passes,
            chunks: chunks.len(),
            candidates,
            dropped,
            ungrounded,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete for '{}': {} extraction(s) in {} ms",
            request.document_id,
            extractions.len(),
            metadata.processing_time_ms
        );

        Ok(ExtractionResult {
            document: AnnotatedDocument::new(request.document_id, request.text)
                .with_extractions(extractions),
            metadata,
        })
    }

    fn validate_request(&self, request: &ExtractionRequest) -> Result<(), ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)?;

        if request.prompt_description.trim().is_empty() {
            return Err(ExtractorError::Config("Prompt description is empty".to_string()));
        }
        if request.examples.is_empty() {
            return Err(ExtractorError::Config(
                "At least one few-shot example is required".to_string(),
            ));
        }
        for (idx, example) in request.examples.iter().enumerate() {
            example
                .validate()
                .map_err(|reason| ExtractorError::InvalidExample {
                    index: idx + 1,
                    reason,
                })?;
        }
        if request.text.trim().is_empty() {
            return Err(ExtractorError::EmptyDocument);
        }
        Ok(())
    }

    /// Call the model for every chunk, at most `max_workers` at a time
    async fn run_pass(
        &self,
        pass: usize,
        chunks: &[TextChunk],
        prompt_builder: &PromptBuilder,
        schema: Option<&str>,
        classes: &[String],
    ) -> Result<PassOutput, ExtractorError> {
        let responses: Vec<String> = stream::iter(chunks.iter().enumerate())
            .map(|(idx, chunk)| {
                let prompt = prompt_builder.build(&chunk.text);
                async move {
                    debug!(
                        "Pass {} chunk {}/{}: offset {}, prompt {} chars",
                        pass,
                        idx + 1,
                        chunks.len(),
                        chunk.char_offset,
                        prompt.len()
                    );
                    self.call_llm(&prompt, schema).await
                }
            })
            .buffered(self.config.max_workers)
            .try_collect()
            .await?;

        let mut output = PassOutput::default();
        for (chunk, response) in chunks.iter().zip(responses) {
            debug!("LLM response length: {} chars", response.len());
            let parsed = parse_llm_response(&response)?;
            output.candidates += parsed.extractions.len() + parsed.skipped;
            output.dropped += parsed.skipped;

            let mut aligner = Aligner::new(&chunk.text);
            for raw in parsed.extractions {
                if !classes.contains(&raw.extraction_class) {
                    warn!(
                        "Dropping '{}': class '{}' is not allowed",
                        raw.extraction_text, raw.extraction_class
                    );
                    output.dropped += 1;
                    continue;
                }

                let extraction = Extraction::new(raw.extraction_class, raw.extraction_text)
                    .with_attributes(raw.attributes);
                let extraction = match aligner.align(&extraction.extraction_text) {
                    Some((interval, status)) => {
                        extraction.grounded(interval.shifted(chunk.char_offset), status)
                    }
                    None => extraction,
                };
                output.extractions.push(extraction);
            }
        }
        Ok(output)
    }

    /// Call the LLM provider, with a per-call timeout
    async fn call_llm(&self, prompt: &str, schema: Option<&str>) -> Result<String, ExtractorError> {
        let call = async {
            match schema {
                Some(schema) => self.llm_provider.generate_structured(prompt, schema).await,
                None => self.llm_provider.generate(prompt).await,
            }
        };

        timeout(self.config.request_timeout(), call)
            .await
            .map_err(|_| ExtractorError::Timeout(self.config.request_timeout_secs))?
            .map_err(|e| ExtractorError::Llm(e.to_string()))
    }
}
