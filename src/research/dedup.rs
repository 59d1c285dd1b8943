//! Identity-based deduplication.
//!
//! Web items are identified by canonical URL, encyclopedia titles by their
//! lower-cased form, documents by their `id`. First-seen wins and order is
//! preserved, so running the deduplicator on its own output is a no-op.

use std::collections::HashSet;

use reqwest::Url;

use crate::types::{CandidateDocument, SearchHit};

/// Something with a stable identity for deduplication.
pub trait DedupKey {
    /// Identity key, or `None` when the item has no usable identity (dropped).
    fn dedup_key(&self) -> Option<String>;
}

impl DedupKey for SearchHit {
    fn dedup_key(&self) -> Option<String> {
        canonical_url(&self.url)
    }
}

impl DedupKey for CandidateDocument {
    fn dedup_key(&self) -> Option<String> {
        (!self.id.is_empty()).then(|| self.id.clone())
    }
}

impl DedupKey for String {
    fn dedup_key(&self) -> Option<String> {
        title_key(self)
    }
}

/// Keep the first item for every identity key, preserving order.
pub fn deduplicate<T, I>(items: I) -> Vec<T>
where
    T: DedupKey,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| match item.dedup_key() {
            Some(key) => seen.insert(key),
            None => false,
        })
        .collect()
}

/// Canonical form of a URL: lower-cased scheme and host, no fragment, no
/// trailing slash. Unparseable URLs fall back to their trimmed text.
pub fn canonical_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let canonical = match Url::parse(trimmed) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => trimmed.to_string(),
    };

    Some(canonical.trim_end_matches('/').to_string())
}

/// Case-normalized title key.
pub fn title_key(title: &str) -> Option<String> {
    let key = title.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}
