//! # Themis - Legal Research Aggregation
//!
//! Collects legal material on a topic from the web and from Wikipedia, ranks
//! it with a lexical legal-relevance heuristic, condenses it into a research
//! brief and turns that brief into a narrative report, either through an
//! analysis backend (Gemini, Ollama) or a deterministic fallback template.
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! themis-research = "0.3"
//! ```
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use themis::{ConfigManager, ResearchCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ConfigManager::new("themis.toml")?;
//!     themis::utils::logging::init_tracing(&manager.config().logging);
//!
//!     let coordinator = ResearchCoordinator::from_config(manager.config()).await?;
//!     let outcome = coordinator.run("non-compete clauses", "employment").await?;
//!
//!     println!("{}", outcome.analysis.narrative_text);
//!     themis::export::save_json(&outcome, "reports")?;
//!     Ok(())
//! }
//! ```
//!
//! ### Progress Reporting
//!
//! ```rust,ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let coordinator = coordinator.with_progress(tx);
//!
//! tokio::spawn(async move {
//!     while let Some(update) = rx.recv().await {
//!         println!("[{:>3.0}%] {}", update.progress * 100.0, update.message);
//!     }
//! });
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local analysis backend (default) |
//!
//! Building with `--no-default-features` leaves Gemini over HTTP as the only
//! backend.
//!
//! ## Modules
//!
//! - [`research`] - Collection, ranking, synthesis and orchestration
//! - [`tools`] - Web search, page fetch and encyclopedia collaborators
//! - [`llm`] - Analysis backends
//! - [`export`] - JSON export of outcomes
//! - [`types`] - Domain types and error handling
//! - [`utils`] - Configuration, logging and text helpers

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// JSON export of research outcomes.
pub mod export;
/// Analysis backend clients and provider selection.
pub mod llm;
/// Legal research pipeline.
pub mod research;
/// Source collaborators (web search, page fetch, Wikipedia).
pub mod tools;
/// Core types (documents, briefs, results, errors).
pub mod types;
/// Configuration, logging and text utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, Provider};
pub use research::{ProgressUpdate, ResearchCoordinator, ResearchPhase};
pub use tools::{Encyclopedia, PageFetcher, WebSearch};
pub use types::{AnalysisResult, AppError, ResearchOutcome, Result};
pub use utils::toml_config::{ConfigManager, ResearchConfig};
