//! Page fetch collaborator
//!
//! [`PageFetcher`] returns the raw markup of a page; the extractor does the
//! rest. [`HttpPageFetcher`] is the default `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::types::{AppError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Fetch page bytes as text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw markup (or text) of `url`; any transport problem, timeout or
    /// non-success status is an error
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// `reqwest`-backed page fetcher with a browser-like user agent
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("GET {} returned {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("Reading {} failed: {}", url, e)))
    }
}
