//! Main-content extraction from fetched pages.
//!
//! Strategy:
//! 1. Try the content containers in [`CONTENT_SELECTORS`] order. The first
//!    selector with any match wins; among its matches the longest text is kept.
//! 2. Fall back to `<body>` when that yields fewer than `min_len` characters.
//! 3. Clean: collapse whitespace, strip boilerplate, keep only sentences that
//!    are long enough and mention a legal keyword.
//! 4. Truncate to `max_len` characters.
//!
//! Subtrees in [`SKIP_TAGS`] never contribute text. Extraction never fails;
//! an empty or short result is how callers learn the page had nothing usable.

use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Node, Selector};

use crate::research::scorer::RelevanceScorer;
use crate::types::{AppError, Result};
use crate::utils::text::{char_len, truncate_chars};
use crate::utils::toml_config::{ConfigError, ResearchConfig};

/// Content containers in priority order. Changing the order changes output.
pub const CONTENT_SELECTORS: [&str; 9] = [
    "main",
    "article",
    ".content",
    "#content",
    ".main-content",
    ".post-content",
    ".entry-content",
    ".page-content",
    "section",
];

/// Elements whose text is never part of the page content.
pub const SKIP_TAGS: [&str; 9] = [
    "script",
    "style",
    "nav",
    "header",
    "footer",
    "aside",
    "advertisement",
    "noscript",
    "iframe",
];

#[derive(Debug, Clone)]
pub struct ContentExtractor {
    min_len: usize,
    max_len: usize,
    min_sentence_chars: usize,
    whitespace: Regex,
    boilerplate: Vec<Regex>,
    scorer: RelevanceScorer,
}

impl ContentExtractor {
    pub fn new(config: &ResearchConfig) -> std::result::Result<Self, ConfigError> {
        let boilerplate = config
            .lexicon
            .boilerplate_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern(pattern.clone(), e.to_string()))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let whitespace = Regex::new(r"\s+")
            .map_err(|e| ConfigError::InvalidPattern(r"\s+".to_string(), e.to_string()))?;

        Ok(Self {
            min_len: config.search.min_content_length,
            max_len: config.search.max_content_length,
            min_sentence_chars: config.search.min_sentence_chars,
            whitespace,
            boilerplate,
            scorer: RelevanceScorer::new(&config.lexicon),
        })
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Cleaned body text of `markup`, at most `max_len` characters.
    pub fn extract(&self, markup: &str) -> String {
        let raw = self.main_text(markup);
        let cleaned = self.clean(&raw);
        truncate_chars(&cleaned, self.max_len).to_string()
    }

    /// Like [`extract`](Self::extract), but a result shorter than `min_len`
    /// is an [`AppError::ExtractionFailure`].
    pub fn extract_checked(&self, markup: &str) -> Result<String> {
        let text = self.extract(markup);
        let length = char_len(&text);
        if length < self.min_len {
            return Err(AppError::ExtractionFailure(format!(
                "{} characters of usable content, need {}",
                length, self.min_len
            )));
        }
        Ok(text)
    }

    fn main_text(&self, markup: &str) -> String {
        let doc = Html::parse_document(markup);
        let mut content = String::new();

        for sel_str in CONTENT_SELECTORS {
            let Ok(selector) = Selector::parse(sel_str) else {
                continue;
            };

            let mut matched = false;
            for element in doc.select(&selector).filter(|el| !inside_skipped(el)) {
                matched = true;
                let text = element_text(&element);
                if char_len(&text) > char_len(&content) {
                    content = text;
                }
            }

            if matched {
                break;
            }
        }

        if char_len(&content) < self.min_len {
            let body = Selector::parse("body")
                .ok()
                .and_then(|sel| doc.select(&sel).next());
            content = match body {
                Some(body) => element_text(&body),
                None => element_text(&doc.root_element()),
            };
        }

        content
    }

    /// Collapse whitespace, strip boilerplate and keep relevant sentences.
    pub fn clean(&self, text: &str) -> String {
        let mut text = self.whitespace.replace_all(text, " ").into_owned();
        for pattern in &self.boilerplate {
            text = pattern.replace_all(&text, "").into_owned();
        }

        text.split('.')
            .map(str::trim)
            .filter(|sentence| {
                char_len(sentence) > self.min_sentence_chars && self.scorer.is_relevant(sentence)
            })
            .collect::<Vec<_>>()
            .join(". ")
    }
}

fn inside_skipped(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| SKIP_TAGS.contains(&el.name()))
    })
}

/// Text of `element` with skipped subtrees removed, fragments joined by spaces.
fn element_text(element: &ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_text(element, &mut parts);
    parts.join(" ")
}

fn collect_text(node: &ElementRef<'_>, parts: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(el) => {
                if SKIP_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, parts);
                }
            }
            _ => {}
        }
    }
}
