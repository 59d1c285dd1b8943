//! Lexical legal-relevance scoring.
//!
//! The score is a fixed heuristic: keyword and phrase occurrences, weighted,
//! normalized by text length and clamped to `[0, 10]`.

use crate::utils::text::char_len;
use crate::utils::toml_config::LexiconConfig;

/// Upper bound of every relevance score
pub const MAX_SCORE: f32 = 10.0;

const KEYWORD_WEIGHT: f64 = 2.0;
const PHRASE_WEIGHT: f64 = 3.0;

#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    keywords: Vec<String>,
    phrases: Vec<String>,
}

impl RelevanceScorer {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self::from_terms(&lexicon.keywords, &lexicon.phrases)
    }

    pub fn from_terms(keywords: &[String], phrases: &[String]) -> Self {
        let normalize = |terms: &[String]| {
            terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        };

        Self {
            keywords: normalize(keywords),
            phrases: normalize(phrases),
        }
    }

    /// Relevance score of `text` in `[0, 10]`; empty text scores 0.
    pub fn score(&self, text: &str) -> f32 {
        let length = char_len(text);
        if length == 0 {
            return 0.0;
        }

        let lower = text.to_lowercase();
        let keyword_points: f64 = self
            .keywords
            .iter()
            .map(|k| lower.matches(k.as_str()).count() as f64 * KEYWORD_WEIGHT)
            .sum();
        let phrase_points: f64 = self
            .phrases
            .iter()
            .map(|p| lower.matches(p.as_str()).count() as f64 * PHRASE_WEIGHT)
            .sum();

        let normalized = (keyword_points + phrase_points) / (length as f64 / 100.0);
        normalized.clamp(0.0, MAX_SCORE as f64) as f32
    }

    /// Number of distinct keywords present in `text`.
    pub fn keyword_hits(&self, text: &str) -> usize {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .count()
    }

    /// True when `text` mentions at least one legal keyword.
    pub fn is_relevant(&self, text: &str) -> bool {
        self.keyword_hits(text) >= 1
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(&LexiconConfig::default())
    }
}
