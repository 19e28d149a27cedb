//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{ExtractionRequest, Extractor, ExtractorConfig, ExtractorError};
    use async_trait::async_trait;
    use std::time::Duration;
    use studio_domain::traits::LlmProvider;
    use studio_domain::{AlignmentStatus, CharInterval, ExampleData, Extraction};
    use studio_llm::{LlmError, MockProvider};

    fn examples() -> Vec<ExampleData> {
        vec![ExampleData::new(
            "Patient takes Lisinopril 10mg daily and reports a dry cough.",
            vec![
                Extraction::new("medication", "Lisinopril").with_attribute("dosage", "10mg"),
                Extraction::new("adverse_reaction", "dry cough"),
            ],
        )]
    }

    fn request(text: &str) -> ExtractionRequest {
        ExtractionRequest::new(
            "note_001",
            text,
            "Extract medications and adverse reactions.",
            examples(),
        )
    }

    fn item(class: &str, text: &str) -> String {
        format!(
            r#"{{"extraction_class": "{}", "extraction_text": "{}", "attributes": {{}}}}"#,
            class, text
        )
    }

    fn response(items: &[String]) -> String {
        format!(r#"{{"extractions": [{}]}}"#, items.join(","))
    }

    #[tokio::test]
    async fn test_full_extraction_flow() {
        let llm = MockProvider::new(
            r#"```json
{"extractions": [
    {"extraction_class": "medication", "extraction_text": "metformin",
     "attributes": {"dosage": "500mg", "frequency": ["twice", "daily"]}}
]}
```"#,
        );
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let result = extractor
            .extract(request("Started metformin 500mg twice daily."))
            .await
            .unwrap();

        let extractions = &result.document.extractions;
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].char_interval, Some(CharInterval::new(8, 17)));
        assert_eq!(extractions[0].alignment_status, Some(AlignmentStatus::MatchExact));
        assert_eq!(extractions[0].extraction_index, Some(1));
        assert_eq!(extractions[0].attributes["frequency"], "twice, daily");
        assert_eq!(result.document.document_id, "note_001");
        assert_eq!(result.metadata.model_id, "mock");
        assert_eq!(result.metadata.chunks, 1);
    }

    #[tokio::test]
    async fn test_padded_text_stored_as_grounded_span() {
        let llm = MockProvider::new(response(&[item("medication", "  Lisinopril ")]));
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let result = extractor.extract(request("Takes Lisinopril daily.")).await.unwrap();
        let extraction = &result.document.extractions[0];
        assert_eq!(extraction.extraction_text, "Lisinopril");
        assert_eq!(extraction.char_interval, Some(CharInterval::new(6, 16)));
        assert_eq!(extraction.alignment_status, Some(AlignmentStatus::MatchExact));
    }

    #[tokio::test]
    async fn test_extraction_with_invalid_json() {
        let extractor = Extractor::new(MockProvider::new("This is not JSON"), ExtractorConfig::default());
        let result = extractor.extract(request("Some text")).await;
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_extraction_with_no_entities() {
        let extractor = Extractor::new(MockProvider::new(r#"{"extractions": []}"#), ExtractorConfig::default());
        let result = extractor.extract(request("Nothing clinical here.")).await.unwrap();
        assert!(result.document.extractions.is_empty());
        assert_eq!(result.document.text, "Nothing clinical here.");
    }

    #[tokio::test]
    async fn test_empty_document_rejected_before_calls() {
        let llm = MockProvider::new(r#"{"extractions": []}"#);
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        let result = extractor.extract(request("   \n ")).await;
        assert!(matches!(result, Err(ExtractorError::EmptyDocument)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_example_rejected_before_calls() {
        let llm = MockProvider::new(r#"{"extractions": []}"#);
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        let mut req = request("Started metformin.");
        req.examples.push(ExampleData::new(
            "ACME shall pay",
            vec![Extraction::new("party", "Widget Co")],
        ));

        match extractor.extract(req).await {
            Err(ExtractorError::InvalidExample { index, reason }) => {
                assert_eq!(index, 2);
                assert!(reason.contains("'Widget Co'"));
            }
            other => panic!("Expected InvalidExample, got {:?}", other.map(|r| r.document)),
        }
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_examples_and_prompt_rejected() {
        let extractor = Extractor::new(MockProvider::default(), ExtractorConfig::default());

        let mut req = request("text");
        req.examples.clear();
        assert!(matches!(extractor.extract(req).await, Err(ExtractorError::Config(_))));

        let mut req = request("text");
        req.prompt_description = "  ".to_string();
        assert!(matches!(extractor.extract(req).await, Err(ExtractorError::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ExtractorConfig::default().with_workers(0);
        let extractor = Extractor::new(MockProvider::default(), config);
        let result = extractor.extract(request("text")).await;
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[tokio::test]
    async fn test_disallowed_class_dropped() {
        let llm = MockProvider::new(response(&[
            item("medication", "aspirin"),
            item("diagnosis", "migraine"),
        ]));
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let result = extractor.extract(request("Took aspirin for migraine.")).await.unwrap();
        assert_eq!(result.document.extractions.len(), 1);
        assert_eq!(result.document.extractions[0].extraction_class, "medication");
        assert_eq!(result.metadata.candidates, 2);
        assert_eq!(result.metadata.dropped, 1);
    }

    #[tokio::test]
    async fn test_explicit_classes_restrict_output() {
        let llm = MockProvider::new(response(&[
            item("medication", "aspirin"),
            item("adverse_reaction", "nausea"),
        ]));
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let req = request("Took aspirin, then nausea.").with_classes(vec!["adverse_reaction".to_string()]);
        let result = extractor.extract(req).await.unwrap();
        assert_eq!(result.document.extractions.len(), 1);
        assert_eq!(result.document.extractions[0].extraction_text, "nausea");
    }

    #[tokio::test]
    async fn test_chunk_offsets_map_to_document() {
        let text = "Took aspirin. Felt dizzy. Took ibuprofen.";
        let llm = MockProvider::new(response(&[]));
        llm.push_response(response(&[item("medication", "aspirin")]));
        llm.push_response(response(&[item("adverse_reaction", "dizzy")]));
        llm.push_response(response(&[item("medication", "ibuprofen")]));

        let config = ExtractorConfig::default().with_char_buffer(15);
        let extractor = Extractor::new(llm.clone(), config);
        let result = extractor.extract(request(text)).await.unwrap();

        assert_eq!(llm.call_count(), 3);
        assert_eq!(result.metadata.chunks, 3);

        let intervals: Vec<CharInterval> = result
            .document
            .extractions
            .iter()
            .filter_map(|e| e.char_interval)
            .collect();
        assert_eq!(
            intervals,
            vec![CharInterval::new(5, 12), CharInterval::new(19, 24), CharInterval::new(31, 40)]
        );

        let chars: Vec<char> = text.chars().collect();
        for extraction in &result.document.extractions {
            let interval = extraction.char_interval.unwrap();
            let slice: String = chars[interval.start_pos..interval.end_pos].iter().collect();
            assert_eq!(slice, extraction.extraction_text);
        }
    }

    #[tokio::test]
    async fn test_parallel_workers_keep_chunk_order() {
        let text = "Took aspirin. Felt dizzy. Took ibuprofen.";
        let llm = MockProvider::new(response(&[]));
        llm.push_response(response(&[item("medication", "aspirin")]));
        llm.push_response(response(&[item("adverse_reaction", "dizzy")]));
        llm.push_response(response(&[item("medication", "ibuprofen")]));

        let config = ExtractorConfig::default().with_char_buffer(15).with_workers(3);
        let extractor = Extractor::new(llm, config);
        let result = extractor.extract(request(text)).await.unwrap();

        let texts: Vec<&str> = result
            .document
            .extractions
            .iter()
            .map(|e| e.extraction_text.as_str())
            .collect();
        assert_eq!(texts, vec!["aspirin", "dizzy", "ibuprofen"]);
    }

    #[tokio::test]
    async fn test_multiple_passes_merge() {
        let text = "Lisinopril 10mg daily caused a cough.";
        let llm = MockProvider::new(response(&[]));
        llm.push_response(response(&[item("medication", "Lisinopril")]));
        llm.push_response(response(&[
            item("medication", "Lisinopril 10mg"),
            item("adverse_reaction", "cough"),
        ]));

        let config = ExtractorConfig::default().with_passes(2);
        let extractor = Extractor::new(llm.clone(), config);
        let result = extractor.extract(request(text)).await.unwrap();

        assert_eq!(llm.call_count(), 2);
        let texts: Vec<&str> = result
            .document
            .extractions
            .iter()
            .map(|e| e.extraction_text.as_str())
            .collect();
        assert_eq!(texts, vec!["Lisinopril", "cough"]);
        assert_eq!(result.metadata.passes, 2);
        assert_eq!(result.metadata.candidates, 3);
    }

    #[tokio::test]
    async fn test_ungrounded_extractions_kept_last() {
        let llm = MockProvider::new(response(&[
            item("medication", "warfarin"),
            item("medication", "ASPIRIN"),
        ]));
        let extractor = Extractor::new(llm, ExtractorConfig::default());
        let result = extractor.extract(request("Took aspirin.")).await.unwrap();

        let extractions = &result.document.extractions;
        assert_eq!(extractions[0].extraction_text, "ASPIRIN");
        assert_eq!(extractions[0].alignment_status, Some(AlignmentStatus::MatchLesser));
        assert_eq!(extractions[1].extraction_text, "warfarin");
        assert!(!extractions[1].is_grounded());
        assert_eq!(result.metadata.ungrounded, 1);
    }

    #[tokio::test]
    async fn test_schema_sent_only_when_enabled() {
        let llm = MockProvider::new(response(&[]));
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());
        extractor.extract(request("Took aspirin.")).await.unwrap();

        let schemas = llm.schemas();
        assert_eq!(schemas.len(), 1);
        assert!(schemas[0].contains("adverse_reaction"));
        assert!(schemas[0].contains("dosage"));

        let llm = MockProvider::new(response(&[]));
        let config = ExtractorConfig::default().with_output_mode(false, false);
        let extractor = Extractor::new(llm.clone(), config);
        extractor.extract(request("Took aspirin.")).await.unwrap();

        assert!(llm.schemas().is_empty());
        assert!(!llm.prompts()[0].contains("```"));
    }

    #[tokio::test]
    async fn test_provider_error_surfaces() {
        let extractor = Extractor::new(MockProvider::new("ERROR"), ExtractorConfig::default());
        let result = extractor.extract(request("Took aspirin.")).await;
        match result {
            Err(ExtractorError::Llm(message)) => assert!(message.contains("Mock error")),
            other => panic!("Expected Llm error, got {:?}", other.map(|r| r.document)),
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        type Error = LlmError;

        async fn generate(&self, _prompt: &str) -> Result<String, Self::Error> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(r#"{"extractions": []}"#.to_string())
        }

        async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
            self.generate(prompt).await
        }

        fn model_id(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_call_timeout() {
        let config = ExtractorConfig {
            request_timeout_secs: 1,
            ..Default::default()
        };
        let extractor = Extractor::new(SlowProvider, config);
        let result = extractor.extract(request("Took aspirin.")).await;
        assert!(matches!(result, Err(ExtractorError::Timeout(1))));
    }
}
