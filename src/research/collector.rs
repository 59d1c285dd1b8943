//! Source collection for a research topic.
//!
//! Two independent branches, each returning a ranked, possibly empty
//! [`Collection`]:
//!
//! - **Web**: two search queries, URL dedup, relevance filter, sequential
//!   fetch + extraction with a politeness delay.
//! - **Encyclopedia**: five query variants, title dedup, page retrieval with
//!   disambiguation handling, page scoring and section selection.
//!
//! No per-item failure escapes a branch. Every dropped item is recorded as a
//! [`SkippedItem`] with its reason.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::research::dedup::{canonical_url, deduplicate, title_key};
use crate::research::extractor::ContentExtractor;
use crate::research::scorer::RelevanceScorer;
use crate::tools::fetch::PageFetcher;
use crate::tools::search::WebSearch;
use crate::tools::wikipedia::Encyclopedia;
use crate::types::{
    AppError, CandidateDocument, DocumentSection, EncyclopediaPage, ExtractionMode, ItemOutcome,
    OriginKind, Result, SearchHit, SkipReason, SkippedItem,
};
use crate::utils::text::{char_len, truncate_chars};
use crate::utils::toml_config::{ConfigError, DisambiguationPolicy, ResearchConfig};

/// Appended to the topic for the second web query
pub const LEGAL_QUERY_SUFFIX: &str = "law legal case court ruling statute";

/// Appended to the topic for the encyclopedia query variants
pub const ENCYCLOPEDIA_VARIANTS: [&str; 5] = ["", " law", " legal", " case law", " legislation"];

/// Name of the leading encyclopedia section
pub const INTRODUCTION: &str = "Introduction";

const SECTION_HEADING: &str = r"\n\n==\s*([^=]+)\s*==\n";

/// Ranked documents from one branch plus everything that was dropped
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub documents: Vec<CandidateDocument>,
    pub skipped: Vec<SkippedItem>,
}

impl Collection {
    fn fold(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Kept(doc) => self.documents.push(doc),
            ItemOutcome::Skipped(item) => self.skipped.push(item),
        }
    }
}

pub struct SourceCollector {
    config: Arc<ResearchConfig>,
    search: Arc<dyn WebSearch>,
    fetcher: Arc<dyn PageFetcher>,
    encyclopedia: Arc<dyn Encyclopedia>,
    extractor: ContentExtractor,
    scorer: RelevanceScorer,
    section_heading: Regex,
}

impl SourceCollector {
    pub fn new(
        config: Arc<ResearchConfig>,
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
        encyclopedia: Arc<dyn Encyclopedia>,
    ) -> Result<Self> {
        let extractor = ContentExtractor::new(&config)?;
        let scorer = RelevanceScorer::new(&config.lexicon);
        let section_heading = Regex::new(SECTION_HEADING)
            .map_err(|e| ConfigError::InvalidPattern(SECTION_HEADING.to_string(), e.to_string()))?;

        Ok(Self {
            config,
            search,
            fetcher,
            encyclopedia,
            extractor,
            scorer,
            section_heading,
        })
    }

    // ============= Web Branch =============

    /// Search, filter, fetch and rank web sources for `topic`.
    pub async fn collect_web(&self, topic: &str) -> Collection {
        let settings = &self.config.search;
        let mut collection = Collection::default();

        let per_query = (settings.max_search_results / 2).max(1);
        let queries = [topic.to_string(), format!("{} {}", topic, LEGAL_QUERY_SUFFIX)];

        let mut hits = Vec::new();
        for query in &queries {
            match timeout(settings.search_timeout(), self.search.search(query, per_query)).await {
                Ok(Ok(found)) => {
                    debug!(query = %query, results = found.len(), "Web search completed");
                    hits.extend(found);
                }
                Ok(Err(e)) => {
                    warn!(query = %query, error = %e, "Web search failed");
                    collection.skipped.push(skipped(
                        OriginKind::Web,
                        query,
                        SkipReason::SearchFailed(e.to_string()),
                    ));
                }
                Err(_) => {
                    warn!(query = %query, "Web search timed out");
                    collection.skipped.push(skipped(
                        OriginKind::Web,
                        query,
                        SkipReason::SearchFailed(format!(
                            "timed out after {:?}",
                            settings.search_timeout()
                        )),
                    ));
                }
            }
        }

        let unique = deduplicate(hits);
        let mut candidates = Vec::new();
        for hit in unique {
            if self.scorer.is_relevant(&format!("{} {}", hit.title, hit.snippet)) {
                candidates.push(hit);
            } else {
                debug!(url = %hit.url, "Dropping search hit without legal keywords");
                collection.skipped.push(skipped(
                    OriginKind::Web,
                    &hit.url,
                    SkipReason::BelowRelevanceThreshold,
                ));
            }
        }
        candidates.truncate(settings.max_fetch);

        let mut fetched_any = false;
        for hit in candidates {
            if !is_http_url(&hit.url) {
                debug!(url = %hit.url, "Skipping non-http url");
                collection.skipped.push(skipped(OriginKind::Web, &hit.url, SkipReason::UnsupportedUrl));
                continue;
            }

            if fetched_any && !settings.fetch_delay().is_zero() {
                sleep(settings.fetch_delay()).await;
            }
            fetched_any = true;

            collection.fold(self.process_hit(hit).await);
        }

        rank(&mut collection.documents);
        info!(
            topic = %topic,
            kept = collection.documents.len(),
            skipped = collection.skipped.len(),
            "Web collection finished"
        );
        collection
    }

    async fn process_hit(&self, hit: SearchHit) -> ItemOutcome {
        let fetch_timeout = self.config.search.fetch_timeout();
        let fetched = match timeout(fetch_timeout, self.fetcher.fetch(&hit.url, fetch_timeout)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Transport(format!("timed out after {:?}", fetch_timeout))),
        };

        match fetched.and_then(|markup| self.extractor.extract_checked(&markup)) {
            Ok(text) => {
                debug!(url = %hit.url, chars = char_len(&text), "Extracted page content");
                ItemOutcome::Kept(self.web_document(hit, text, ExtractionMode::Full))
            }
            Err(AppError::ExtractionFailure(reason)) => {
                if char_len(&hit.snippet) >= self.extractor.min_len() {
                    debug!(url = %hit.url, reason = %reason, "Falling back to search snippet");
                    let snippet = hit.snippet.clone();
                    ItemOutcome::Kept(self.web_document(hit, snippet, ExtractionMode::Snippet))
                } else {
                    debug!(url = %hit.url, reason = %reason, "Dropping page without usable content");
                    ItemOutcome::Skipped(skipped(
                        OriginKind::Web,
                        &hit.url,
                        SkipReason::InsufficientContent,
                    ))
                }
            }
            Err(e) => {
                warn!(url = %hit.url, error = %e, "Page fetch failed, keeping snippet");
                let snippet = hit.snippet.clone();
                ItemOutcome::Kept(self.web_document(hit, snippet, ExtractionMode::Snippet))
            }
        }
    }

    fn web_document(&self, hit: SearchHit, text: String, extraction: ExtractionMode) -> CandidateDocument {
        let id = canonical_url(&hit.url).unwrap_or_else(|| hit.url.clone());
        CandidateDocument {
            id,
            title: hit.title,
            url: hit.url,
            origin_kind: OriginKind::Web,
            snippet: hit.snippet,
            content_length: char_len(&text),
            relevance_score: self.scorer.score(&text),
            extracted_text: text,
            extraction,
            sections: Vec::new(),
        }
    }

    // ============= Encyclopedia Branch =============

    /// Look up, resolve, score and rank encyclopedia articles for `topic`.
    pub async fn collect_encyclopedia(&self, topic: &str) -> Collection {
        let settings = &self.config.search;
        let mut collection = Collection::default();

        let per_query = (settings.max_wikipedia_pages / ENCYCLOPEDIA_VARIANTS.len()).max(1);
        let mut titles = Vec::new();
        for suffix in ENCYCLOPEDIA_VARIANTS {
            let query = format!("{}{}", topic, suffix);
            match timeout(
                settings.search_timeout(),
                self.encyclopedia.search_titles(&query, per_query),
            )
            .await
            {
                Ok(Ok(found)) => {
                    debug!(query = %query, results = found.len(), "Encyclopedia search completed");
                    titles.extend(found);
                }
                Ok(Err(e)) => {
                    warn!(query = %query, error = %e, "Encyclopedia search failed");
                    collection.skipped.push(skipped(
                        OriginKind::Encyclopedia,
                        &query,
                        SkipReason::SearchFailed(e.to_string()),
                    ));
                }
                Err(_) => {
                    warn!(query = %query, "Encyclopedia search timed out");
                    collection.skipped.push(skipped(
                        OriginKind::Encyclopedia,
                        &query,
                        SkipReason::SearchFailed(format!(
                            "timed out after {:?}",
                            settings.search_timeout()
                        )),
                    ));
                }
            }
        }

        for title in deduplicate(titles) {
            collection.fold(self.process_title(&title).await);
        }

        collection.documents = deduplicate(std::mem::take(&mut collection.documents));
        rank(&mut collection.documents);
        collection.documents.truncate(settings.max_wikipedia_pages);

        info!(
            topic = %topic,
            kept = collection.documents.len(),
            skipped = collection.skipped.len(),
            "Encyclopedia collection finished"
        );
        collection
    }

    async fn process_title(&self, title: &str) -> ItemOutcome {
        let page = match self.fetch_page(title).await {
            Ok(page) => page,
            Err(AppError::Disambiguation { options, .. }) => {
                let alternative = match self.config.search.disambiguation {
                    DisambiguationPolicy::FirstAlternative => options.first().cloned(),
                    DisambiguationPolicy::Skip => None,
                };
                let Some(alternative) = alternative else {
                    debug!(title = %title, "Skipping ambiguous title");
                    return ItemOutcome::Skipped(skipped(
                        OriginKind::Encyclopedia,
                        title,
                        SkipReason::Disambiguation(options),
                    ));
                };

                debug!(title = %title, alternative = %alternative, "Resolving ambiguous title");
                match self.fetch_page(&alternative).await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(title = %title, alternative = %alternative, error = %e, "Alternative page failed");
                        return ItemOutcome::Skipped(skipped(
                            OriginKind::Encyclopedia,
                            title,
                            page_skip_reason(e),
                        ));
                    }
                }
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Encyclopedia page failed");
                return ItemOutcome::Skipped(skipped(
                    OriginKind::Encyclopedia,
                    title,
                    page_skip_reason(e),
                ));
            }
        };

        let score = self.scorer.score(&page.content);
        if score <= self.config.search.wiki_relevance_threshold {
            debug!(title = %page.title, score, "Page below relevance threshold");
            return ItemOutcome::Skipped(skipped(
                OriginKind::Encyclopedia,
                &page.title,
                SkipReason::BelowRelevanceThreshold,
            ));
        }

        ItemOutcome::Kept(self.encyclopedia_document(page, score))
    }

    async fn fetch_page(&self, title: &str) -> Result<EncyclopediaPage> {
        let limit = self.config.search.fetch_timeout();
        match timeout(limit, self.encyclopedia.get_page(title)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Transport(format!("timed out after {:?}", limit))),
        }
    }

    fn encyclopedia_document(&self, page: EncyclopediaPage, score: f32) -> CandidateDocument {
        let settings = &self.config.search;
        let sections = self.split_sections(&page.content);
        let id = title_key(&page.title).unwrap_or_else(|| page.url.clone());

        CandidateDocument {
            id,
            content_length: char_len(&page.content),
            extracted_text: truncate_chars(&page.content, settings.page_excerpt_chars).to_string(),
            title: page.title,
            url: page.url,
            origin_kind: OriginKind::Encyclopedia,
            snippet: page.summary,
            relevance_score: score,
            extraction: ExtractionMode::Full,
            sections,
        }
    }

    /// Introduction plus every legally relevant `== Heading ==` section.
    pub fn split_sections(&self, content: &str) -> Vec<DocumentSection> {
        let limit = self.config.search.section_max_chars;
        let mut sections = Vec::new();

        let mut headings = self.section_heading.captures_iter(content).peekable();
        let intro_end = headings
            .peek()
            .and_then(|caps| caps.get(0))
            .map_or(content.len(), |m| m.start());
        let intro = content[..intro_end].trim();
        if !intro.is_empty() {
            sections.push(DocumentSection {
                name: INTRODUCTION.to_string(),
                text: truncate_chars(intro, limit).to_string(),
            });
        }

        while let Some(caps) = headings.next() {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let body_end = headings
                .peek()
                .and_then(|next| next.get(0))
                .map_or(content.len(), |m| m.start());
            let name = name.as_str().trim();
            let body = content[whole.end()..body_end].trim();

            if self.scorer.is_relevant(&format!("{} {}", name, body)) {
                sections.push(DocumentSection {
                    name: name.to_string(),
                    text: truncate_chars(body, limit).to_string(),
                });
            }
        }

        sections
    }
}

/// Stable sort by relevance, highest first.
pub fn rank(documents: &mut [CandidateDocument]) {
    documents.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

fn is_http_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| matches!(parsed.scheme(), "http" | "https"))
}

fn skipped(source: OriginKind, item: &str, reason: SkipReason) -> SkippedItem {
    SkippedItem {
        source,
        item: item.to_string(),
        reason,
    }
}

fn page_skip_reason(error: AppError) -> SkipReason {
    match error {
        AppError::NotFound(_) => SkipReason::NotFound,
        AppError::Disambiguation { options, .. } => SkipReason::Disambiguation(options),
        other => SkipReason::FetchFailed(other.to_string()),
    }
}
