//! Encyclopedia collaborator
//!
//! [`Encyclopedia`] is what the collector needs from an encyclopedia: title
//! search and full-page retrieval. [`WikipediaClient`] implements it against
//! the MediaWiki action API using plain-text extracts.
//!
//! Page retrieval reports ambiguous titles as [`AppError::Disambiguation`]
//! carrying the alternatives listed on the disambiguation page, in page
//! order, and missing pages as [`AppError::NotFound`].

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::types::{AppError, EncyclopediaPage, Result};

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Link prefixes outside the article namespace
const NON_ARTICLE_PREFIXES: [&str; 10] = [
    "Wikipedia:",
    "Help:",
    "Special:",
    "File:",
    "Category:",
    "Template:",
    "Template_talk:",
    "Portal:",
    "Talk:",
    "Module:",
];

/// Query an encyclopedia service
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Up to `max_results` article titles matching `query`
    async fn search_titles(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

    /// Full article for `title`
    async fn get_page(&self, title: &str) -> Result<EncyclopediaPage>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    query: Option<PageQuery>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParsedPage>,
}

#[derive(Debug, Deserialize)]
struct ParsedPage {
    #[serde(default)]
    text: String,
}

/// MediaWiki client (English Wikipedia by default)
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    api_url: String,
}

impl WikipediaClient {
    pub fn new() -> Result<Self> {
        Self::with_api_url(DEFAULT_API_URL)
    }

    /// Point the client at another MediaWiki `api.php` endpoint
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("themis-research/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    async fn query<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Wikipedia request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("Wikipedia returned {}", status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Transport(format!("Malformed Wikipedia response: {}", e)))
    }

    /// Article links listed on a disambiguation page, in page order
    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>> {
        let response: ParseResponse = self
            .query(&[
                ("action", "parse"),
                ("page", title),
                ("prop", "text"),
                ("redirects", "1"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        let html = response.parse.map(|p| p.text).unwrap_or_default();
        Ok(listed_alternatives(&html))
    }
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    async fn search_titles(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let limit = max_results.to_string();
        let response: SearchResponse = self
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit),
                ("srprop", ""),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|entry| entry.title).collect())
            .unwrap_or_default())
    }

    async fn get_page(&self, title: &str) -> Result<EncyclopediaPage> {
        let response: PageResponse = self
            .query(&[
                ("action", "query"),
                ("prop", "extracts|info|pageprops"),
                ("explaintext", "1"),
                ("exsectionformat", "wiki"),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        let page = response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or_else(|| AppError::NotFound(title.to_string()))?;

        if page.missing {
            return Err(AppError::NotFound(title.to_string()));
        }

        let is_disambiguation = page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some());
        if is_disambiguation {
            let options = self.disambiguation_options(&page.title).await?;
            return Err(AppError::Disambiguation {
                title: page.title,
                options,
            });
        }

        let content = page.extract.unwrap_or_default();
        let summary = lead_section(&content).to_string();
        let url = page.fullurl.unwrap_or_else(|| {
            format!("https://en.wikipedia.org/wiki/{}", page.title.replace(' ', "_"))
        });

        Ok(EncyclopediaPage {
            title: page.title,
            url,
            summary,
            content,
        })
    }
}

/// First article link of every list item outside the table of contents,
/// deduplicated in document order.
fn listed_alternatives(html: &str) -> Vec<String> {
    let (Ok(items), Ok(anchors)) = (Selector::parse("li"), Selector::parse("a[href]")) else {
        return Vec::new();
    };

    let document = Html::parse_fragment(html);
    let mut options: Vec<String> = Vec::new();
    for item in document.select(&items) {
        let in_toc = item
            .value()
            .attr("class")
            .is_some_and(|class| class.contains("toc"));
        if in_toc {
            continue;
        }
        let Some(anchor) = item.select(&anchors).next() else {
            continue;
        };
        let Some(target) = anchor
            .value()
            .attr("href")
            .and_then(|href| href.strip_prefix("/wiki/"))
        else {
            continue;
        };
        if NON_ARTICLE_PREFIXES.iter().any(|prefix| target.starts_with(prefix)) {
            continue;
        }

        let title = match anchor.value().attr("title") {
            Some(title) => title.to_string(),
            None => anchor.text().collect::<String>().trim().to_string(),
        };
        if !title.is_empty() && !options.contains(&title) {
            options.push(title);
        }
    }
    options
}

/// Text before the first `== Heading ==` line.
fn lead_section(content: &str) -> &str {
    let end = content.find("\n\n==").unwrap_or(content.len());
    content[..end].trim()
}
