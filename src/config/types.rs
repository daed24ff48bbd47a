use serde::Deserialize;

/// Main configuration structure for Lemma-Search
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub lemmatizer: LemmatizerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Referer header sent with every request
    #[serde(default)]
    pub referrer: Option<String>,

    /// Delay applied before each request (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Whether HTTP redirects are followed
    #[serde(rename = "follow-redirects", default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of page fetches in flight across one indexing run
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Morphological analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LemmatizerConfig {
    /// Language of the indexed sites ("russian" or "english")
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for LemmatizerConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Page size used when a query does not specify a limit
    #[serde(rename = "default-limit", default = "default_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

/// A site to be indexed
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Root URL of the site (e.g., "https://example.com")
    pub url: String,

    /// Display name of the site
    pub name: String,
}

fn default_delay_ms() -> u64 {
    150
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_concurrent_fetches() -> u32 {
    8
}

fn default_language() -> String {
    "russian".to_string()
}

fn default_limit() -> usize {
    20
}
