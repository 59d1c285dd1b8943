//! Collaborators for source collection
//!
//! The research pipeline never talks to the network directly. It consumes
//! three injected capabilities, each a trait with a default implementation:
//!
//! - [`search`](crate::tools::search) - [`WebSearch`](search::WebSearch), DuckDuckGo via daedra
//! - [`fetch`](crate::tools::fetch) - [`PageFetcher`](fetch::PageFetcher), raw page markup via reqwest
//! - [`wikipedia`](crate::tools::wikipedia) - [`Encyclopedia`](wikipedia::Encyclopedia), MediaWiki API
//!
//! The analysis backend lives in [`crate::llm`].
//!
//! # Example
//!
//! ```ignore
//! let search = DaedraSearch::new();
//! let hits = search.search("non-compete clauses", 5).await?;
//! for hit in hits {
//!     println!("{}: {}", hit.title, hit.url);
//! }
//! ```

/// Page fetching over HTTP.
pub mod fetch;
/// Web search using DuckDuckGo.
pub mod search;
/// Wikipedia title search and page retrieval.
pub mod wikipedia;

pub use fetch::{HttpPageFetcher, PageFetcher};
pub use search::{DaedraSearch, WebSearch};
pub use wikipedia::{Encyclopedia, WikipediaClient};
