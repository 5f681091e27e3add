//! LLM client abstraction and provider selection
//!
//! - **Gemini**: default provider, plain REST over reqwest
//! - **OpenAI**: feature `openai`, any OpenAI-compatible endpoint
//! - **Ollama**: feature `ollama`, local inference

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{AppError, Result};
use crate::utils::toml_config::{AdalatConfig, LlmProvider};

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Generic LLM client trait for provider abstraction
///
/// All providers implement this trait so the assistant never depends on a
/// concrete backend.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate with conversation history
    async fn generate_with_history(
        &self,
        messages: &[(String, String)], // (role, content) pairs
    ) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Feature | Notes |
/// |----------|---------|-------|
/// | Gemini | always | Default, `x-goog-api-key` auth |
/// | OpenAI | `openai` | Also OpenRouter and other compatible APIs |
/// | Ollama | `ollama` | No API key |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini `generateContent` API
    Gemini {
        api_key: String,
        base_url: String,
        model: String,
        temperature: f32,
        max_output_tokens: u32,
        timeout: Duration,
    },

    /// OpenAI API provider (including compatible APIs)
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Resolve the provider described by `[llm]`, reading the API key from
    /// the configured environment variable.
    pub fn from_config(config: &AdalatConfig) -> Result<Self> {
        let llm = &config.llm;
        match llm.provider {
            LlmProvider::Gemini => Ok(Provider::Gemini {
                api_key: config.api_key()?,
                base_url: llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| GEMINI_DEFAULT_BASE_URL.to_string()),
                model: llm.model.clone(),
                temperature: llm.temperature,
                max_output_tokens: llm.max_output_tokens,
                timeout: Duration::from_secs(llm.timeout_secs),
            }),
            LlmProvider::OpenAI => Ok(Provider::OpenAI {
                api_key: config.api_key()?,
                api_base: llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
                model: llm.model.clone(),
            }),
            LlmProvider::Ollama => Ok(Provider::Ollama {
                base_url: llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| OLLAMA_DEFAULT_BASE_URL.to_string()),
                model: llm.model.clone(),
            }),
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's feature is not compiled in or the
    /// HTTP client cannot be constructed.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::Gemini {
                api_key,
                base_url,
                model,
                temperature,
                max_output_tokens,
                timeout,
            } => Ok(Box::new(
                super::gemini::GeminiClient::new(api_key.clone(), base_url.clone(), model.clone())
                    .with_generation(*temperature, *max_output_tokens)
                    .with_timeout(*timeout)?,
            )),

            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()).await?,
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::LLM(format!(
                "{} provider is not compiled in. Rebuild with `--features {}`.",
                other.name(),
                other.name().to_lowercase()
            ))),
        }
    }

    /// Check if this provider is available in the current build
    pub fn is_enabled(&self) -> bool {
        match self {
            Provider::Gemini { .. } => true,
            Provider::OpenAI { .. } => cfg!(feature = "openai"),
            Provider::Ollama { .. } => cfg!(feature = "ollama"),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini { model, .. }
            | Provider::OpenAI { model, .. }
            | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Configuration-based client factory
///
/// ```rust,ignore
/// let factory = LLMClientFactory::from_config(&config)?;
/// let client = factory.create_default().await?;
/// ```
pub struct LLMClientFactory {
    default_provider: Provider,
}

impl LLMClientFactory {
    /// Create a new factory with the specified default provider
    pub fn new(default_provider: Provider) -> Self {
        Self { default_provider }
    }

    /// Create a factory for the provider configured in `[llm]`
    pub fn from_config(config: &AdalatConfig) -> Result<Self> {
        Ok(Self::new(Provider::from_config(config)?))
    }

    /// Create a client using the default provider
    pub async fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        self.default_provider.create_client().await
    }

    /// Create a client using a specific provider
    pub async fn create_with_provider(&self, provider: Provider) -> Result<Box<dyn LLMClient>> {
        provider.create_client().await
    }

    /// Get a reference to the default provider
    pub fn default_provider(&self) -> &Provider {
        &self.default_provider
    }
}

/// Stand-in used when no provider could be configured (usually a missing
/// API key). Every call fails with the stored reason, which the assistant
/// turns into its error reply; search and statistics keep working.
pub struct UnconfiguredClient {
    model: String,
    reason: String,
}

impl UnconfiguredClient {
    pub fn new(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reason: reason.into(),
        }
    }

    fn error(&self) -> AppError {
        AppError::LLM(format!("LLM is not configured: {}", self.reason))
    }
}

#[async_trait]
impl LLMClient for UnconfiguredClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(self.error())
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        Err(self.error())
    }

    async fn generate_with_history(&self, _messages: &[(String, String)]) -> Result<String> {
        Err(self.error())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::LlmConfig;

    fn config_with(provider: LlmProvider, key_env: &str) -> AdalatConfig {
        AdalatConfig {
            llm: LlmConfig {
                provider,
                api_key_env: key_env.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_gemini_from_config() {
        std::env::set_var("ADALAT_TEST_CLIENT_KEY", "k-123");
        let provider =
            Provider::from_config(&config_with(LlmProvider::Gemini, "ADALAT_TEST_CLIENT_KEY"))
                .unwrap();
        match provider {
            Provider::Gemini {
                ref api_key,
                ref base_url,
                ..
            } => {
                assert_eq!(api_key, "k-123");
                assert_eq!(base_url, GEMINI_DEFAULT_BASE_URL);
            }
            _ => panic!("expected Gemini"),
        }
        assert_eq!(provider.model(), "gemini-1.5-flash");
        assert!(provider.is_enabled());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = Provider::from_config(&config_with(
            LlmProvider::Gemini,
            "ADALAT_TEST_CLIENT_KEY_UNSET",
        ));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let provider =
            Provider::from_config(&config_with(LlmProvider::Ollama, "ADALAT_TEST_UNSET_2"))
                .unwrap();
        assert_eq!(provider.name(), "Ollama");
    }

    #[cfg(not(feature = "openai"))]
    #[tokio::test]
    async fn test_disabled_provider_returns_helpful_error() {
        let provider = Provider::OpenAI {
            api_key: "k".to_string(),
            api_base: OPENAI_DEFAULT_BASE_URL.to_string(),
            model: "gpt-4o-mini".to_string(),
        };
        assert!(!provider.is_enabled());

        // Box<dyn LLMClient> doesn't implement Debug
        let err = match provider.create_client().await {
            Ok(_) => panic!("Expected error"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("--features openai"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_with_reason() {
        let client = UnconfiguredClient::new("gemini-1.5-flash", "GOOGLE_API_KEY is not set");
        let err = client.generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY is not set"));
        assert_eq!(client.model_name(), "gemini-1.5-flash");
    }
}
