//! Lemma-Search: a site crawler and lemma-based search engine
//!
//! This crate crawls a configured set of web sites, reduces page text to
//! lemmas, maintains an inverted index of lemma → page postings, and answers
//! ranked free-text queries with highlighted snippets.

pub mod config;
pub mod crawler;
pub mod lemma;
pub mod morphology;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for Lemma-Search operations
#[derive(Debug, Error)]
pub enum LemmaSearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Morphology error: {0}")]
    Morphology(#[from] morphology::MorphologyError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("{}", not_indexed_message(.site))]
    NotIndexedSite { site: Option<String> },

    #[error("Indexing is already running")]
    AlreadyIndexing,

    #[error("Indexing is not running")]
    NotIndexing,

    #[error("Page {url} is outside of the configured sites")]
    PageOutsideSites { url: String },

    #[error("Page {url} cannot be indexed: HTTP {status}")]
    PageUnavailable { url: String, status: u16 },

    #[error("Task error: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn not_indexed_message(site: &Option<String>) -> String {
    match site {
        Some(site) => format!("Site {} is not indexed", site),
        None => "None of the sites are indexed".to_string(),
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lemma-Search operations
pub type Result<T> = std::result::Result<T, LemmaSearchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{IndexingRun, IndexingService};
pub use lemma::{LemmaIndexer, Lemmatizer};
pub use search::{SearchEngine, SearchQuery, SearchResponse, SearchResult};
pub use state::{CrawlOutcome, SiteStatus};
pub use storage::{SharedStorage, SqliteStorage, Storage};
