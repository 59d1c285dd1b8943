//! Web search collaborator
//!
//! The collector talks to the search surface only through [`WebSearch`].
//! [`DaedraSearch`] is the default implementation, backed by the daedra
//! crate, which uses DuckDuckGo as the search backend.

use crate::types::{AppError, Result, SearchHit};
use async_trait::async_trait;

/// Query a general web search surface
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Up to `max_results` hits for `query`, in the engine's ranking order
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Web search powered by daedra
pub struct DaedraSearch;

impl DaedraSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DaedraSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearch for DaedraSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Empty search query".to_string()));
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .take(max_results)
                .map(|r| SearchHit {
                    title: r.title.trim().to_string(),
                    url: r.url.trim().to_string(),
                    snippet: collapse_whitespace(&r.description),
                })
                .collect()),
            Err(e) => Err(AppError::Transport(format!("Search failed: {}", e))),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
