use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============= Collaborator Types =============

/// A single hit returned by the web search surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// A resolved encyclopedia page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncyclopediaPage {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub content: String,
}

// ============= Candidate Documents =============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    Web,
    Encyclopedia,
}

impl std::fmt::Display for OriginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginKind::Web => write!(f, "web"),
            OriginKind::Encyclopedia => write!(f, "encyclopedia"),
        }
    }
}

/// Where a document's `extracted_text` came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Text extracted from the fetched page body
    Full,
    /// Fetch or extraction failed; the search snippet stands in
    Snippet,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSection {
    pub name: String,
    pub text: String,
}

/// A single source item collected and scored during a research run.
///
/// Built once by the collector and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateDocument {
    /// Canonical URL for web items, lower-cased title for encyclopedia items
    pub id: String,
    pub title: String,
    pub url: String,
    pub origin_kind: OriginKind,
    pub snippet: String,
    pub extracted_text: String,
    /// Character count of the scored content
    pub content_length: usize,
    /// Legal relevance score in `[0, 10]`
    pub relevance_score: f32,
    pub extraction: ExtractionMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<DocumentSection>,
}

impl CandidateDocument {
    /// Text used for synthesis: the extracted body, else the snippet.
    pub fn content(&self) -> &str {
        if self.extracted_text.is_empty() {
            &self.snippet
        } else {
            &self.extracted_text
        }
    }
}

// ============= Skip Bookkeeping =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    SearchFailed(String),
    UnsupportedUrl,
    InsufficientContent,
    Disambiguation(Vec<String>),
    NotFound,
    FetchFailed(String),
    BelowRelevanceThreshold,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SearchFailed(e) => write!(f, "search failed: {}", e),
            SkipReason::UnsupportedUrl => write!(f, "unsupported url"),
            SkipReason::InsufficientContent => write!(f, "insufficient content"),
            SkipReason::Disambiguation(options) => {
                write!(f, "ambiguous title ({} alternatives)", options.len())
            }
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            SkipReason::BelowRelevanceThreshold => write!(f, "below relevance threshold"),
        }
    }
}

/// An item the collector dropped, kept for observability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedItem {
    pub source: OriginKind,
    /// URL, title or query that was skipped
    pub item: String,
    pub reason: SkipReason,
}

/// Result of processing one source item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Kept(CandidateDocument),
    Skipped(SkippedItem),
}

// ============= Research Brief =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceExcerpt {
    pub title: String,
    pub url: String,
    pub relevance_score: f32,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleExcerpt {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub relevance_score: f32,
    /// Leading retained sections with shortened text
    pub highlights: Vec<DocumentSection>,
}

/// Condensed, size-bounded summary of the ranked candidates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchBrief {
    pub topic: String,
    pub domain: String,
    pub domain_context: String,
    pub web_summary: String,
    pub wiki_summary: String,
    pub key_points: Vec<String>,
    pub top_web_sources: Vec<SourceExcerpt>,
    pub top_wiki_articles: Vec<ArticleExcerpt>,
    /// `"{article} - {section}"` to section text, in document order
    pub key_sections: Vec<(String, String)>,
    pub web_count: usize,
    pub wiki_count: usize,
    pub data_quality: f32,
}

impl ResearchBrief {
    pub fn sources_count(&self) -> usize {
        self.web_count + self.wiki_count
    }
}

// ============= Analysis Output =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub topic: String,
    pub domain: String,
    pub narrative_text: String,
    pub timestamp: DateTime<Utc>,
    pub sources_count: usize,
    /// Run-level data quality score in `[0, 10]`
    pub quality_score: f32,
    /// Set when the narrative was produced without the analysis backend
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Everything a research run hands to downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutcome {
    pub run_id: Uuid,
    pub analysis: AnalysisResult,
    pub web_documents: Vec<CandidateDocument>,
    pub wiki_documents: Vec<CandidateDocument>,
    pub skipped: Vec<SkippedItem>,
    pub duration_ms: u64,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Extraction failure: {0}")]
    ExtractionFailure(String),

    #[error("'{title}' is ambiguous: {} alternatives", .options.len())]
    Disambiguation { title: String, options: Vec<String> },

    #[error("Analysis backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::utils::toml_config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
