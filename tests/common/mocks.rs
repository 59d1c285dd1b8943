//! Mock implementations for testing.
//!
//! Hand-written collaborators for the research pipeline, shared across test
//! files so that no test touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use themis::llm::LLMClient;
use themis::tools::{Encyclopedia, PageFetcher, WebSearch};
use themis::types::{AppError, EncyclopediaPage, Result, SearchHit};

/// Mock web search returning the same hits for every query.
///
/// # Examples
///
/// ```ignore
/// let search = MockWebSearch::new(vec![SearchHit::new("Title", "https://a.example", "court")]);
/// let search = MockWebSearch::failing();
/// ```
#[derive(Default)]
pub struct MockWebSearch {
    hits: Vec<SearchHit>,
    should_fail: bool,
    queries: Mutex<Vec<String>>,
}

impl MockWebSearch {
    /// Create a search that answers every query with `hits`.
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    /// Create a search whose every query fails with a transport error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for MockWebSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.should_fail {
            return Err(AppError::Transport("Mock search failure".to_string()));
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

/// Mock page fetcher serving markup per URL.
///
/// Unknown URLs fail with a transport error, as do URLs registered with
/// [`MockPageFetcher::failing_for`].
#[derive(Default)]
pub struct MockPageFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl MockPageFetcher {
    /// Create a fetcher with no pages; every fetch fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Serve `markup` for `url`.
    pub fn with_page(mut self, url: &str, markup: &str) -> Self {
        self.pages.insert(url.to_string(), markup.to_string());
        self
    }

    /// Make `url` fail even if a page was registered for it.
    pub fn failing_for(mut self, url: &str) -> Self {
        self.pages.remove(url);
        self
    }

    /// URLs fetched so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Transport(format!("Mock fetch failure for {}", url)))
    }
}

/// Mock encyclopedia with fixed search results, pages and disambiguations.
#[derive(Default)]
pub struct MockEncyclopedia {
    titles: Vec<String>,
    pages: HashMap<String, EncyclopediaPage>,
    disambiguations: HashMap<String, Vec<String>>,
    should_fail: bool,
}

impl MockEncyclopedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encyclopedia whose every call fails with a transport error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Answer every title search with `titles`.
    pub fn with_search(mut self, titles: &[&str]) -> Self {
        self.titles = titles.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Serve a page whose summary is the text before the first heading.
    pub fn with_page(mut self, title: &str, content: &str) -> Self {
        let summary = content.split("\n\n==").next().unwrap_or("").trim().to_string();
        self.pages.insert(
            title.to_string(),
            EncyclopediaPage {
                title: title.to_string(),
                url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
                summary,
                content: content.to_string(),
            },
        );
        self
    }

    /// Report `title` as ambiguous with the given alternatives.
    pub fn with_disambiguation(mut self, title: &str, options: &[&str]) -> Self {
        self.disambiguations.insert(
            title.to_string(),
            options.iter().map(|o| o.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl Encyclopedia for MockEncyclopedia {
    async fn search_titles(&self, _query: &str, max_results: usize) -> Result<Vec<String>> {
        if self.should_fail {
            return Err(AppError::Transport("Mock encyclopedia failure".to_string()));
        }
        Ok(self.titles.iter().take(max_results).cloned().collect())
    }

    async fn get_page(&self, title: &str) -> Result<EncyclopediaPage> {
        if self.should_fail {
            return Err(AppError::Transport("Mock encyclopedia failure".to_string()));
        }
        if let Some(options) = self.disambiguations.get(title) {
            return Err(AppError::Disambiguation {
                title: title.to_string(),
                options: options.clone(),
            });
        }
        self.pages
            .get(title)
            .cloned()
            .ok_or_else(|| AppError::NotFound(title.to_string()))
    }
}

/// Mock analysis backend with configurable responses.
///
/// # Examples
///
/// ```ignore
/// let client = MockLLMClient::new("## Executive Summary\nFindings");
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    delay: Option<Duration>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            delay: None,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            delay: None,
        }
    }

    /// Create a mock client that answers only after `delay`.
    pub fn slow(response: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(response)
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(AppError::BackendUnavailable("Mock backend failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
