//! Runtime provider selection

use crate::{GeminiProvider, LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use studio_domain::traits::LlmProvider as LlmProviderTrait;

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini
    Gemini,
    /// OpenAI
    OpenAi,
    /// Local Ollama
    Ollama,
}

impl ProviderKind {
    /// Models offered for this provider, default first
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Gemini => &["gemini-2.5-flash", "gemini-2.5-pro", "gemini-2.0-flash"],
            ProviderKind::OpenAi => &["gpt-4o", "gpt-4o-mini"],
            ProviderKind::Ollama => &["gemma2:2b", "llama3.1:8b", "mistral:7b"],
        }
    }

    /// Default model for this provider
    pub fn default_model(&self) -> &'static str {
        self.models()[0]
    }

    /// Environment variables consulted for the API key, in priority order
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Gemini => &["LANGEXTRACT_API_KEY", "GEMINI_API_KEY"],
            ProviderKind::OpenAi => &["OPENAI_API_KEY"],
            ProviderKind::Ollama => &[],
        }
    }

    /// Whether calls need an API key
    pub fn requires_api_key(&self) -> bool {
        !self.api_key_vars().is_empty()
    }

    /// First non-empty API key found in the environment
    pub fn api_key_from_env(&self) -> Option<String> {
        self.api_key_vars()
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
    }

    /// Whether few-shot answers are wrapped in ```json fences
    pub fn fence_output(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }

    /// Whether the provider enforces a response schema
    pub fn use_schema_constraints(&self) -> bool {
        matches!(self, ProviderKind::Gemini)
    }

    /// Stable identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" | "local" => Ok(ProviderKind::Ollama),
            other => Err(LlmError::Other(format!("Unknown provider: {}", other))),
        }
    }
}

/// Everything needed to construct a provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Backend
    pub kind: ProviderKind,
    /// Model identifier
    pub model: String,
    /// API key; required for Gemini and OpenAI
    pub api_key: Option<String>,
    /// Endpoint override (Ollama URL or API base URL)
    pub model_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

/// A provider chosen at runtime
pub enum Provider {
    /// Google Gemini
    Gemini(GeminiProvider),
    /// OpenAI
    OpenAi(OpenAiProvider),
    /// Local Ollama
    Ollama(OllamaProvider),
    /// Deterministic mock
    Mock(MockProvider),
}

impl Provider {
    /// Build a provider from settings.
    ///
    /// Fails with [`LlmError::Authentication`] when the backend needs an API
    /// key and none was supplied.
    pub fn build(settings: ProviderSettings) -> Result<Self, LlmError> {
        let api_key = settings.api_key.filter(|k| !k.trim().is_empty());

        let require_key = |key: Option<String>| {
            key.ok_or_else(|| {
                LlmError::Authentication(format!(
                    "No API key for {}. Set {} or pass --api-key.",
                    settings.kind,
                    settings.kind.api_key_vars().join(" or ")
                ))
            })
        };

        let provider = match settings.kind {
            ProviderKind::Gemini => {
                let mut p = GeminiProvider::new(require_key(api_key)?, &settings.model)
                    .with_timeout(settings.timeout);
                if let Some(url) = settings.model_url {
                    p = p.with_base_url(url);
                }
                Provider::Gemini(p)
            }
            ProviderKind::OpenAi => {
                let mut p = OpenAiProvider::new(require_key(api_key)?, &settings.model)
                    .with_timeout(settings.timeout);
                if let Some(url) = settings.model_url {
                    p = p.with_base_url(url);
                }
                Provider::OpenAi(p)
            }
            ProviderKind::Ollama => {
                let endpoint = settings
                    .model_url
                    .unwrap_or_else(|| crate::ollama::DEFAULT_ENDPOINT.to_string());
                Provider::Ollama(OllamaProvider::new(endpoint, &settings.model).with_timeout(settings.timeout))
            }
        };
        Ok(provider)
    }
}

#[async_trait]
impl LlmProviderTrait for Provider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            Provider::Gemini(p) => p.generate(prompt).await,
            Provider::OpenAi(p) => p.generate(prompt).await,
            Provider::Ollama(p) => p.generate(prompt).await,
            Provider::Mock(p) => p.generate(prompt).await,
        }
    }

    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        match self {
            Provider::Gemini(p) => p.generate_structured(prompt, schema).await,
            Provider::OpenAi(p) => p.generate_structured(prompt, schema).await,
            Provider::Ollama(p) => p.generate_structured(prompt, schema).await,
            Provider::Mock(p) => p.generate_structured(prompt, schema).await,
        }
    }

    fn model_id(&self) -> &str {
        match self {
            Provider::Gemini(p) => p.model_id(),
            Provider::OpenAi(p) => p.model_id(),
            Provider::Ollama(p) => p.model_id(),
            Provider::Mock(p) => p.model_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: ProviderKind, api_key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            kind,
            model: kind.default_model().to_string(),
            api_key: api_key.map(String::from),
            model_url: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("local".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("anthropomorphic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_defaults() {
        assert_eq!(ProviderKind::Gemini.default_model(), "gemini-2.5-flash");
        assert!(ProviderKind::Gemini.use_schema_constraints());
        assert!(!ProviderKind::OpenAi.use_schema_constraints());
        assert!(!ProviderKind::Ollama.fence_output());
        assert!(!ProviderKind::Ollama.requires_api_key());
    }

    #[test]
    fn test_build_requires_key() {
        let result = Provider::build(settings(ProviderKind::Gemini, None));
        assert!(matches!(result, Err(LlmError::Authentication(_))));

        let result = Provider::build(settings(ProviderKind::OpenAi, Some("  ")));
        assert!(matches!(result, Err(LlmError::Authentication(_))));
    }

    #[test]
    fn test_build_ollama_without_key() {
        let provider = Provider::build(settings(ProviderKind::Ollama, None)).unwrap();
        assert!(matches!(provider, Provider::Ollama(_)));
        assert_eq!(provider.model_id(), "gemma2:2b");
    }

    #[test]
    fn test_build_gemini_with_key() {
        let provider = Provider::build(settings(ProviderKind::Gemini, Some("key"))).unwrap();
        assert_eq!(provider.model_id(), "gemini-2.5-flash");
    }
}
