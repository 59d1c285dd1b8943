//! Research brief synthesis and run-level data quality.
//!
//! The brief is the size-bounded digest of a run's ranked documents. It feeds
//! both the analysis prompt and the fallback report, so every list in it is
//! capped here and nowhere else.

use crate::research::scorer::RelevanceScorer;
use crate::types::{ArticleExcerpt, CandidateDocument, DocumentSection, ResearchBrief, SourceExcerpt};
use crate::utils::text::{char_len, preview, truncate_chars};
use crate::utils::toml_config::{LexiconConfig, ResearchConfig};

pub const MAX_KEY_POINTS: usize = 15;
pub const KEY_POINTS_PER_DOCUMENT: usize = 3;
pub const MAX_EXCERPTS: usize = 5;

const MIN_CONTRIBUTING_CHARS: usize = 50;
const MIN_KEY_POINT_CHARS: usize = 30;
const PREVIEW_CHARS: usize = 200;
const ARTICLE_SUMMARY_CHARS: usize = 300;
const HIGHLIGHT_SECTIONS: usize = 2;
const HIGHLIGHT_CHARS: usize = 200;
const MIN_KEY_SECTION_CHARS: usize = 100;
const KEY_SECTION_CHARS: usize = 500;

const QUALITY_CEILING: f32 = 10.0;

pub struct BriefSynthesizer {
    scorer: RelevanceScorer,
    meaningless: Vec<String>,
    lexicon: LexiconConfig,
}

impl BriefSynthesizer {
    pub fn new(config: &ResearchConfig) -> Self {
        Self {
            scorer: RelevanceScorer::new(&config.lexicon),
            meaningless: config
                .lexicon
                .meaningless_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            lexicon: config.lexicon.clone(),
        }
    }

    /// Digest ranked web and encyclopedia documents into a [`ResearchBrief`].
    pub fn synthesize(
        &self,
        topic: &str,
        domain: &str,
        web: &[CandidateDocument],
        wiki: &[CandidateDocument],
    ) -> ResearchBrief {
        let mut key_points = Vec::new();
        let mut top_web_sources = Vec::new();
        let mut total_chars = 0;

        for doc in web {
            let content = doc.content();
            let length = char_len(content);
            if length <= MIN_CONTRIBUTING_CHARS {
                continue;
            }

            key_points.extend(
                content
                    .split('.')
                    .map(str::trim)
                    .filter(|sentence| self.is_meaningful(sentence))
                    .take(KEY_POINTS_PER_DOCUMENT)
                    .map(str::to_string),
            );

            if top_web_sources.len() < MAX_EXCERPTS {
                top_web_sources.push(SourceExcerpt {
                    title: doc.title.clone(),
                    url: doc.url.clone(),
                    relevance_score: doc.relevance_score,
                    preview: preview(content, PREVIEW_CHARS),
                });
            }
            total_chars += length;
        }
        key_points.truncate(MAX_KEY_POINTS);

        let web_summary = if web.is_empty() {
            "No search data available".to_string()
        } else {
            format!(
                "Processed {} web sources with {} characters of content",
                web.len(),
                total_chars
            )
        };

        let top_wiki_articles = wiki
            .iter()
            .take(MAX_EXCERPTS)
            .map(|doc| ArticleExcerpt {
                title: doc.title.clone(),
                url: doc.url.clone(),
                summary: truncate_chars(&doc.snippet, ARTICLE_SUMMARY_CHARS).to_string(),
                relevance_score: doc.relevance_score,
                highlights: doc
                    .sections
                    .iter()
                    .take(HIGHLIGHT_SECTIONS)
                    .map(|section| DocumentSection {
                        name: section.name.clone(),
                        text: truncate_chars(&section.text, HIGHLIGHT_CHARS).to_string(),
                    })
                    .collect(),
            })
            .collect();

        let key_sections = wiki
            .iter()
            .flat_map(|doc| {
                doc.sections
                    .iter()
                    .filter(|section| char_len(&section.text) > MIN_KEY_SECTION_CHARS)
                    .map(move |section| {
                        (
                            format!("{} - {}", doc.title, section.name),
                            truncate_chars(&section.text, KEY_SECTION_CHARS).to_string(),
                        )
                    })
            })
            .collect();

        let wiki_summary = if wiki.is_empty() {
            "No Wikipedia data available".to_string()
        } else {
            format!("Processed {} Wikipedia articles", wiki.len())
        };

        ResearchBrief {
            topic: topic.to_string(),
            domain: domain.to_string(),
            domain_context: self.lexicon.domain_context(domain).to_string(),
            web_summary,
            wiki_summary,
            key_points,
            top_web_sources,
            top_wiki_articles,
            key_sections,
            web_count: web.len(),
            wiki_count: wiki.len(),
            data_quality: data_quality(web, wiki),
        }
    }

    /// A sentence worth quoting: long enough, mentions a legal keyword, and
    /// is not navigation text.
    pub fn is_meaningful(&self, sentence: &str) -> bool {
        if char_len(sentence) <= MIN_KEY_POINT_CHARS || !self.scorer.is_relevant(sentence) {
            return false;
        }
        let lower = sentence.to_lowercase();
        !self.meaningless.iter().any(|phrase| lower.contains(phrase.as_str()))
    }
}

// ============= Data Quality =============

/// Average per-document quality over all documents, in `[0, 10]`.
pub fn data_quality(web: &[CandidateDocument], wiki: &[CandidateDocument]) -> f32 {
    let total = web.len() + wiki.len();
    if total == 0 {
        return 0.0;
    }

    let sum: f32 = web.iter().map(web_quality).sum::<f32>() + wiki.iter().map(wiki_quality).sum::<f32>();
    (sum / total as f32).clamp(0.0, QUALITY_CEILING)
}

fn web_quality(doc: &CandidateDocument) -> f32 {
    let length_points = match doc.content_length {
        n if n > 2000 => 3.0,
        n if n > 1000 => 2.0,
        n if n > 500 => 1.0,
        _ => 0.0,
    };
    length_points + (doc.relevance_score / 2.5).min(4.0) + credibility(&doc.url)
}

fn wiki_quality(doc: &CandidateDocument) -> f32 {
    let completeness = if doc.sections.len() > 3 { 2.0 } else { 0.0 };
    5.0 + (doc.relevance_score / 2.0).min(3.0) + completeness
}

/// Source credibility from URL patterns: 3 for government, education and
/// law sites, 2 for non-profits and courts, 0 for blogs, forums and social
/// media, 1 otherwise.
pub fn credibility(url: &str) -> f32 {
    let url = url.to_lowercase();
    let has_any = |patterns: &[&str]| patterns.iter().any(|p| url.contains(p));

    if has_any(&[".gov", ".edu", "law.", "legal"]) {
        3.0
    } else if has_any(&[".org", "court", "justice"]) {
        2.0
    } else if !has_any(&["blog", "forum", "social"]) {
        1.0
    } else {
        0.0
    }
}
