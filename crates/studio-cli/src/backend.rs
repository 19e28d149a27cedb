//! Model backend selection: provider, model, endpoint and API key.

use crate::config::Config;
use studio_extractor::ExtractorConfig;
use studio_llm::{ProviderKind, ProviderSettings};

/// Backend chosen for a run, before the provider is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// Provider
    pub kind: ProviderKind,
    /// Model; the provider's default when absent
    pub model: Option<String>,
    /// Endpoint override
    pub model_url: Option<String>,
    /// Explicit API key; the environment is consulted when absent
    pub api_key: Option<String>,
}

impl Backend {
    /// Backend from the configuration file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            kind: config.provider.kind,
            model: config.provider.model.clone(),
            model_url: config.provider.model_url.clone(),
            api_key: None,
        }
    }

    /// Switch provider; a model chosen for the old provider is dropped.
    pub fn set_kind(&mut self, kind: ProviderKind) {
        if kind != self.kind {
            self.kind = kind;
            self.model = None;
            self.model_url = None;
        }
    }

    /// Model to use.
    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.kind.default_model().to_string())
    }

    /// Explicit key, else the provider's environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.kind.api_key_from_env())
    }

    /// Whether the checklist's API key item passes.
    pub fn has_api_key(&self) -> bool {
        !self.kind.requires_api_key() || self.api_key().is_some()
    }

    /// Settings for building the provider.
    pub fn settings(&self, engine: &ExtractorConfig) -> ProviderSettings {
        ProviderSettings {
            kind: self.kind,
            model: self.model(),
            api_key: self.api_key(),
            model_url: self.model_url.clone(),
            timeout: engine.request_timeout(),
        }
    }

    /// Engine options with the output mode narrowed to what the provider supports.
    pub fn engine_config(&self, base: &ExtractorConfig) -> ExtractorConfig {
        base.clone().with_output_mode(
            base.fence_output && self.kind.fence_output(),
            base.use_schema_constraints && self.kind.use_schema_constraints(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.provider.model = Some("gemini-2.5-pro".to_string());
        let backend = Backend::from_config(&config);
        assert_eq!(backend.kind, ProviderKind::Gemini);
        assert_eq!(backend.model(), "gemini-2.5-pro");
    }

    #[test]
    fn test_switching_provider_resets_model() {
        let mut backend = Backend::from_config(&Config::default());
        backend.model = Some("gemini-2.5-pro".to_string());
        backend.set_kind(ProviderKind::Ollama);
        assert_eq!(backend.model(), "gemma2:2b");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut backend = Backend::from_config(&Config::default());
        backend.set_kind(ProviderKind::Ollama);
        assert!(backend.has_api_key());
    }

    #[test]
    fn test_explicit_key() {
        let mut backend = Backend::from_config(&Config::default());
        backend.api_key = Some("secret".to_string());
        assert!(backend.has_api_key());
        assert_eq!(backend.settings(&ExtractorConfig::default()).api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_output_mode_follows_provider() {
        let base = ExtractorConfig::default();
        let mut backend = Backend::from_config(&Config::default());

        let engine = backend.engine_config(&base);
        assert!(engine.fence_output);
        assert!(engine.use_schema_constraints);

        backend.set_kind(ProviderKind::Ollama);
        let engine = backend.engine_config(&base);
        assert!(!engine.fence_output);
        assert!(!engine.use_schema_constraints);

        let engine = backend.engine_config(&base.with_output_mode(false, false));
        assert!(!engine.use_schema_constraints);
    }
}
