//! Legal Research Pipeline
//!
//! This module turns a topic into a ranked, summarized body of sources and a
//! narrative report.
//!
//! # Architecture
//!
//! Leaves first:
//! - [`extractor::ContentExtractor`] - page markup to cleaned body text
//! - [`scorer::RelevanceScorer`] - text to a bounded legal relevance score
//! - [`dedup`] - identity-based deduplication
//! - [`collector::SourceCollector`] - web and encyclopedia collection
//! - [`brief::BriefSynthesizer`] - ranked documents to a [`ResearchBrief`](crate::types::ResearchBrief)
//! - [`fallback::FallbackReportBuilder`] - deterministic report without a backend
//! - [`prompt`] - analysis prompt and answer formatting
//! - [`coordinator::ResearchCoordinator`] - drives the run
//!
//! # Usage
//!
//! ```ignore
//! use themis::research::coordinator::ResearchCoordinator;
//!
//! let coordinator = ResearchCoordinator::from_config(config).await?;
//! let outcome = coordinator.run("non-compete clauses", "employment").await?;
//!
//! println!("{}", outcome.analysis.narrative_text);
//! for doc in outcome.web_documents {
//!     println!("- {} ({:.1})", doc.url, doc.relevance_score);
//! }
//! ```
//!
//! # Research Workflow
//!
//! 1. **Web Collection** - Search, filter, fetch and extract
//! 2. **Encyclopedia Collection** - Look up articles, resolve ambiguity, pick sections
//! 3. **Synthesis** - Key points, excerpts and data quality
//! 4. **Analysis** - Backend narrative, or the fallback report

/// Research brief synthesis and data quality scoring.
pub mod brief;
/// Web and encyclopedia source collection.
pub mod collector;
/// Research run orchestration and progress reporting.
pub mod coordinator;
/// Identity-based deduplication.
pub mod dedup;
/// Main-content extraction from HTML.
pub mod extractor;
/// Backend-free report generation.
pub mod fallback;
/// Analysis prompt and answer formatting.
pub mod prompt;
/// Lexical legal-relevance scoring.
pub mod scorer;

pub use collector::{Collection, SourceCollector};
pub use coordinator::{ProgressUpdate, ResearchCoordinator, ResearchPhase};
