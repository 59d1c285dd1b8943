//! TOML-based configuration for Themis
//!
//! This module provides declarative configuration for search limits, the legal
//! lexicon used by extraction and scoring, the domain taxonomy, the analysis
//! backend, and logging via a TOML file (`themis.toml`).
//!
//! Every field has a default, so an empty file (or no file at all, via
//! [`ResearchConfig::default`]) yields the stock behaviour.
//!
//! # Snapshots
//!
//! A research run works against one immutable `Arc<ResearchConfig>`. Use
//! [`ConfigManager`] to swap in new settings between runs; runs already in
//! flight keep the snapshot they started with.

use arc_swap::ArcSwap;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Root configuration structure loaded from themis.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub lexicon: LexiconConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= Search Configuration =============

/// What to do when an encyclopedia title turns out to be ambiguous
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisambiguationPolicy {
    /// Retry once with the first listed alternative
    #[default]
    FirstAlternative,
    /// Discard the title
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result budget shared by the web search queries
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    #[serde(default = "default_max_wikipedia_pages")]
    pub max_wikipedia_pages: usize,

    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// How many filtered web results get their page fetched
    #[serde(default = "default_max_fetch")]
    pub max_fetch: usize,

    /// Politeness delay between successive page fetches
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Encyclopedia pages scoring at or below this are discarded
    #[serde(default = "default_wiki_relevance_threshold")]
    pub wiki_relevance_threshold: f32,

    #[serde(default = "default_section_max_chars")]
    pub section_max_chars: usize,

    /// Length of the page content kept on encyclopedia documents
    #[serde(default = "default_page_excerpt_chars")]
    pub page_excerpt_chars: usize,

    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,

    #[serde(default)]
    pub disambiguation: DisambiguationPolicy,
}

fn default_max_search_results() -> usize {
    15
}

fn default_max_wikipedia_pages() -> usize {
    8
}

fn default_min_content_length() -> usize {
    200
}

fn default_max_content_length() -> usize {
    5000
}

fn default_max_fetch() -> usize {
    10
}

fn default_fetch_delay_ms() -> u64 {
    500
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_wiki_relevance_threshold() -> f32 {
    1.0
}

fn default_section_max_chars() -> usize {
    1000
}

fn default_page_excerpt_chars() -> usize {
    3000
}

fn default_min_sentence_chars() -> usize {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_search_results: default_max_search_results(),
            max_wikipedia_pages: default_max_wikipedia_pages(),
            min_content_length: default_min_content_length(),
            max_content_length: default_max_content_length(),
            max_fetch: default_max_fetch(),
            fetch_delay_ms: default_fetch_delay_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            search_timeout_secs: default_search_timeout_secs(),
            wiki_relevance_threshold: default_wiki_relevance_threshold(),
            section_max_chars: default_section_max_chars(),
            page_excerpt_chars: default_page_excerpt_chars(),
            min_sentence_chars: default_min_sentence_chars(),
            disambiguation: DisambiguationPolicy::default(),
        }
    }
}

impl SearchConfig {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

// ============= Lexicon Configuration =============

/// Keyword lists, boilerplate patterns and the legal domain taxonomy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Legal content indicators, each worth 2 points per occurrence
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Legal phrases, each worth 3 points per occurrence
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,

    /// Case-insensitive regexes removed from extracted page text
    #[serde(default = "default_boilerplate_patterns")]
    pub boilerplate_patterns: Vec<String>,

    /// Sentences containing any of these never become key points
    #[serde(default = "default_meaningless_phrases")]
    pub meaningless_phrases: Vec<String>,

    /// Domain key to the context string used in prompts and reports
    #[serde(default = "default_domains")]
    pub domains: BTreeMap<String, String>,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_keywords() -> Vec<String> {
    to_strings(&[
        "case law",
        "precedent",
        "statute",
        "regulation",
        "court",
        "judge",
        "ruling",
        "verdict",
        "legal",
        "law",
        "attorney",
        "lawyer",
        "jurisdiction",
        "appeal",
        "litigation",
        "contract",
        "agreement",
        "liability",
        "damages",
        "plaintiff",
        "defendant",
        "evidence",
        "testimony",
        "witness",
        "legal principle",
    ])
}

fn default_phrases() -> Vec<String> {
    to_strings(&[
        "case law",
        "legal precedent",
        "court ruling",
        "statute provides",
        "legal principle",
        "court held",
        "legal standard",
        "applicable law",
    ])
}

fn default_boilerplate_patterns() -> Vec<String> {
    to_strings(&[
        r"cookie policy.*?accept",
        r"subscribe.*?newsletter",
        r"follow us.*?social",
        r"advertisement",
        r"sponsored content",
        r"related articles",
        r"share this.*?twitter",
    ])
}

fn default_meaningless_phrases() -> Vec<String> {
    to_strings(&[
        "click here",
        "read more",
        "subscribe",
        "follow us",
        "cookie policy",
    ])
}

fn default_domains() -> BTreeMap<String, String> {
    [
        (
            "contracts",
            "Contract Law, Agreement Analysis, Terms and Conditions, Breach of Contract",
        ),
        (
            "criminal",
            "Criminal Law, Prosecution, Defense, Evidence, Criminal Procedure",
        ),
        (
            "ip",
            "Intellectual Property, Patents, Trademarks, Copyright, Trade Secrets",
        ),
        (
            "corporate",
            "Corporate Law, Business Regulations, Compliance, Securities",
        ),
        (
            "family",
            "Family Law, Divorce, Custody, Marriage, Domestic Relations",
        ),
        (
            "employment",
            "Employment Law, Labor Rights, Workplace Issues, Discrimination",
        ),
        (
            "real_estate",
            "Property Law, Real Estate Transactions, Zoning, Land Use",
        ),
        (
            "tax",
            "Tax Law, Revenue, Deductions, Compliance, Tax Planning",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Context used when a domain key is not in the taxonomy
pub const GENERAL_DOMAIN_CONTEXT: &str = "General Legal Research";

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            phrases: default_phrases(),
            boilerplate_patterns: default_boilerplate_patterns(),
            meaningless_phrases: default_meaningless_phrases(),
            domains: default_domains(),
        }
    }
}

impl LexiconConfig {
    /// Resolve a domain key to its context string
    pub fn domain_context(&self, domain: &str) -> &str {
        self.domains
            .get(domain)
            .map(String::as_str)
            .unwrap_or(GENERAL_DOMAIN_CONTEXT)
    }
}

// ============= Backend Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        /// Environment variable containing the API key
        api_key_env: String,
        #[serde(default = "default_gemini_base")]
        api_base: String,
        #[serde(default = "default_gemini_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
}

fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Analysis backend; research runs in degraded mode when absent
    #[serde(default)]
    pub provider: Option<ProviderConfig>,

    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_timeout_secs() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: None,
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Invalid boilerplate pattern '{0}': {1}")]
    InvalidPattern(String, String),
}

impl ResearchConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ResearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate limits and patterns. Backend keys are resolved when the
    /// client is created, so a missing key degrades a run instead of failing it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;

        if search.min_content_length > search.max_content_length {
            return Err(ConfigError::ValidationError(format!(
                "min_content_length ({}) exceeds max_content_length ({})",
                search.min_content_length, search.max_content_length
            )));
        }

        for (name, value) in [
            ("max_search_results", search.max_search_results),
            ("max_wikipedia_pages", search.max_wikipedia_pages),
            ("max_content_length", search.max_content_length),
            ("max_fetch", search.max_fetch),
            ("section_max_chars", search.section_max_chars),
            ("page_excerpt_chars", search.page_excerpt_chars),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        if !(0.0..=10.0).contains(&search.wiki_relevance_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "wiki_relevance_threshold must be within [0, 10], got {}",
                search.wiki_relevance_threshold
            )));
        }

        if self.lexicon.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "lexicon.keywords must contain at least one keyword".to_string(),
            ));
        }

        for pattern in &self.lexicon.boilerplate_patterns {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::InvalidPattern(pattern.clone(), e.to_string()))?;
        }

        Ok(())
    }

    /// Resolve a domain key to its context string
    pub fn domain_context(&self, domain: &str) -> &str {
        self.lexicon.domain_context(domain)
    }
}

// ============= Configuration Manager =============

/// Thread-safe holder of the current configuration snapshot
///
/// Readers get a lockless `Arc` snapshot; [`ConfigManager::update`] and
/// [`ConfigManager::reload`] swap in a new, validated value.
pub struct ConfigManager {
    config: Arc<ArcSwap<ResearchConfig>>,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load `.env`, then the configuration file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = ResearchConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: Some(path),
        })
    }

    /// Create a manager directly from a config; `reload` is then a no-op
    pub fn from_config(config: ResearchConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: None,
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<ResearchConfig> {
        self.config.load_full()
    }

    /// Re-read the configuration file
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };

        info!("Reloading configuration from {:?}", path);
        let new_config = ResearchConfig::load(path)?;
        self.config.store(Arc::new(new_config));
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Replace the current settings after validating them
    pub fn update(&self, config: ResearchConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config.store(Arc::new(config));
        info!("Configuration updated");
        Ok(())
    }
}

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
        }
    }
}
