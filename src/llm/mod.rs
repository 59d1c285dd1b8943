//! Analysis Backend Clients
//!
//! The final step of a research run sends the assembled analysis prompt to a
//! language model. This module hides the provider behind [`LLMClient`], so the
//! coordinator works with any backend, or none at all (degraded mode).
//!
//! # Supported Providers
//!
//! - `gemini` - Google Generative Language API (always available)
//! - `ollama` - Local Ollama server (Cargo feature `ollama`, on by default)
//!
//! # Example
//!
//! ```ignore
//! use themis::llm::Provider;
//!
//! let provider = Provider::from_config(&provider_config)?;
//! let client = provider.create_client().await?;
//! let narrative = client.generate(&prompt).await?;
//! ```

/// Core analysis backend trait and provider selection.
pub mod client;
/// Google Gemini backend.
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider};
