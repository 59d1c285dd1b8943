//! Structured JSON export of research outcomes
//!
//! [`ExportSummary`] is the persisted shape: topic, domain, the narrative,
//! run metadata and the top sources of each kind. [`save_json`] writes it as
//! `legal_research_{topic_slug}_{YYYYmmdd_HHMMSS}.json`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::types::{CandidateDocument, ResearchOutcome, Result};

/// Sources of each kind listed in the summary
pub const TOP_SOURCES: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSummary {
    pub research_topic: String,
    pub domain: String,
    pub analysis: String,
    pub metadata: ExportMetadata,
    pub summary: SourceSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportMetadata {
    pub timestamp: DateTime<Utc>,
    pub total_sources: usize,
    pub data_quality_score: f32,
    pub degraded: bool,
    pub system_version: String,
    pub run_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSummary {
    pub total_web_sources: usize,
    pub total_wiki_sources: usize,
    pub top_web_sources: Vec<SourceRef>,
    pub top_wiki_sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub legal_score: f32,
}

impl SourceRef {
    fn from_document(doc: &CandidateDocument) -> Self {
        Self {
            title: doc.title.clone(),
            url: doc.url.clone(),
            legal_score: doc.relevance_score,
        }
    }
}

impl ExportSummary {
    pub fn from_outcome(outcome: &ResearchOutcome) -> Self {
        let analysis = &outcome.analysis;
        let top = |docs: &[CandidateDocument]| {
            docs.iter()
                .take(TOP_SOURCES)
                .map(SourceRef::from_document)
                .collect::<Vec<_>>()
        };

        Self {
            research_topic: analysis.topic.clone(),
            domain: analysis.domain.clone(),
            analysis: analysis.narrative_text.clone(),
            metadata: ExportMetadata {
                timestamp: analysis.timestamp,
                total_sources: analysis.sources_count,
                data_quality_score: analysis.quality_score,
                degraded: analysis.degraded,
                system_version: env!("CARGO_PKG_VERSION").to_string(),
                run_id: outcome.run_id,
                model: analysis.model.clone(),
                duration_ms: outcome.duration_ms,
            },
            summary: SourceSummary {
                total_web_sources: outcome.web_documents.len(),
                total_wiki_sources: outcome.wiki_documents.len(),
                top_web_sources: top(&outcome.web_documents),
                top_wiki_sources: top(&outcome.wiki_documents),
            },
        }
    }

    /// File name for this export, derived from topic and analysis time
    pub fn file_name(&self) -> String {
        format!(
            "legal_research_{}_{}.json",
            topic_slug(&self.research_topic),
            self.metadata.timestamp.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Write the export for `outcome` into `dir`, returning the file path.
pub fn save_json(outcome: &ResearchOutcome, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let summary = ExportSummary::from_outcome(outcome);
    let path = dir.join(summary.file_name());
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&path, json)?;

    info!(path = %path.display(), run_id = %outcome.run_id, "Saved research export");
    Ok(path)
}

/// Topic reduced to word characters joined by underscores.
pub fn topic_slug(topic: &str) -> String {
    let kept: String = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_separator = false;
    for c in kept.chars() {
        if c == '-' || c.is_whitespace() {
            if !in_separator {
                slug.push('_');
                in_separator = true;
            }
        } else {
            slug.push(c);
            in_separator = false;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisResult, ExtractionMode, OriginKind};
    use chrono::TimeZone;
    use rstest::rstest;

    fn doc(i: usize, kind: OriginKind) -> CandidateDocument {
        CandidateDocument {
            id: format!("doc-{}", i),
            title: format!("Source {}", i),
            url: format!("https://example.com/{}", i),
            origin_kind: kind,
            snippet: String::new(),
            extracted_text: String::new(),
            content_length: 0,
            relevance_score: 10.0 - i as f32,
            extraction: ExtractionMode::Snippet,
            sections: vec![],
        }
    }

    fn outcome() -> ResearchOutcome {
        ResearchOutcome {
            run_id: Uuid::new_v4(),
            analysis: AnalysisResult {
                topic: "Non-compete clauses".to_string(),
                domain: "employment".to_string(),
                narrative_text: "LEGAL RESEARCH REPORT".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
                sources_count: 9,
                quality_score: 6.5,
                degraded: true,
                model: None,
            },
            web_documents: (0..7).map(|i| doc(i, OriginKind::Web)).collect(),
            wiki_documents: (0..2).map(|i| doc(i, OriginKind::Encyclopedia)).collect(),
            skipped: vec![],
            duration_ms: 1234,
        }
    }

    #[rstest]
    #[case("non-compete clauses", "non_compete_clauses")]
    #[case("Fair use? (US)", "Fair_use_US")]
    #[case("  trade -- secrets ", "_trade_secrets_")]
    #[case("", "")]
    fn test_topic_slug(#[case] topic: &str, #[case] expected: &str) {
        assert_eq!(topic_slug(topic), expected);
    }

    #[test]
    fn test_summary_from_outcome() {
        let outcome = outcome();
        let summary = ExportSummary::from_outcome(&outcome);

        assert_eq!(summary.research_topic, "Non-compete clauses");
        assert_eq!(summary.metadata.run_id, outcome.run_id);
        assert_eq!(summary.metadata.system_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(summary.summary.total_web_sources, 7);
        assert_eq!(summary.summary.top_web_sources.len(), TOP_SOURCES);
        assert_eq!(summary.summary.top_wiki_sources.len(), 2);
        assert_eq!(summary.summary.top_web_sources[0].legal_score, 10.0);
        assert_eq!(
            summary.file_name(),
            "legal_research_Non_compete_clauses_20240305_140709.json"
        );
    }

    #[test]
    fn test_save_json_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = outcome();

        let path = save_json(&outcome, dir.path().join("exports")).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: ExportSummary = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, ExportSummary::from_outcome(&outcome));
        assert!(content.contains("\"degraded\": true"));
    }
}
