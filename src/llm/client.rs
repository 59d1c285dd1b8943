//! Analysis backend abstractions and provider selection
//!
//! The research coordinator hands a fully assembled prompt to an
//! [`LLMClient`] and treats whatever comes back as the narrative. Supported
//! backends:
//! - **Gemini**: Google Generative Language API over HTTP
//! - **Ollama**: Local inference (requires the `ollama` feature)

use crate::types::{AppError, Result};
use crate::utils::toml_config::{ConfigError, ProviderConfig};
use async_trait::async_trait;

/// Generic analysis backend trait
///
/// Every backend implements this trait, so the coordinator never needs to
/// know which provider produced the narrative.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// # Supported Providers
///
/// | Provider | Transport | Notes |
/// |----------|-----------|-------|
/// | Gemini | reqwest | Default hosted backend |
/// | Ollama | ollama-rs | Local, behind the `ollama` feature |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini `generateContent` endpoint
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: std::env::var("GEMINI_API_KEY")?,
    ///     api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
    ///     model: "gemini-pro".to_string(),
    /// };
    /// ```
    Gemini {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Build a provider from its configuration, resolving the API key from
    /// the environment
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Gemini {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = std::env::var(api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::Gemini {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                })
            }
            ProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The provider's feature is not compiled in
    /// - The provider URL is invalid
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::Gemini {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::gemini::GeminiClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )?)),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()).await?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { model, .. } => Err(AppError::BackendUnavailable(format!(
                "Ollama support not compiled in (model '{}'); enable the `ollama` feature",
                model
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
            Provider::Ollama { .. } => "Ollama",
        }
    }
}
