//! Statistics generation from the index database
//!
//! This module provides functionality for extracting and displaying
//! per-site indexing statistics from the storage layer.

use crate::config::Config;
use crate::crawler::normalize_site_url;
use crate::state::SiteStatus;
use crate::storage::Storage;
use crate::LemmaSearchError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Error reported for configured sites that have never been indexed
pub const NOT_STARTED_ERROR: &str = "Indexing has not been started yet";

/// Totals across all configured sites
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalStatistics {
    pub sites: usize,
    pub pages: u64,
    pub lemmas: u64,
    pub indexing: bool,
}

/// Statistics of one configured site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedStatistics {
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: DateTime<Utc>,
    pub error: Option<String>,
    pub pages: u64,
    pub lemmas: u64,
}

/// Index statistics summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total: TotalStatistics,
    pub detailed: Vec<DetailedStatistics>,
}

/// Loads statistics for every configured site
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `config` - Configuration listing the sites
/// * `indexing` - Whether an indexing run is active
///
/// # Returns
///
/// * `Ok(Statistics)` - Successfully loaded statistics
/// * `Err(LemmaSearchError)` - Failed to query statistics
pub fn collect_statistics(
    storage: &dyn Storage,
    config: &Config,
    indexing: bool,
) -> Result<Statistics, LemmaSearchError> {
    let mut detailed = Vec::with_capacity(config.sites.len());

    for entry in &config.sites {
        let url = normalize_site_url(&entry.url)?;

        let item = match storage.find_site_by_url(&url)? {
            Some(site) => DetailedStatistics {
                pages: storage.count_pages(site.id)?,
                lemmas: storage.count_lemmas(site.id)?,
                url: site.url,
                name: site.name,
                status: site.status,
                status_time: site.status_time,
                error: site.last_error,
            },
            None => DetailedStatistics {
                url,
                name: entry.name.clone(),
                status: SiteStatus::Failed,
                status_time: Utc::now(),
                error: Some(NOT_STARTED_ERROR.to_string()),
                pages: 0,
                lemmas: 0,
            },
        };
        detailed.push(item);
    }

    let total = TotalStatistics {
        sites: config.sites.len(),
        pages: detailed.iter().map(|d| d.pages).sum(),
        lemmas: detailed.iter().map(|d| d.lemmas).sum(),
        indexing,
    };

    Ok(Statistics { total, detailed })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &Statistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Sites: {}", stats.total.sites);
    println!("  Pages: {}", stats.total.pages);
    println!("  Lemmas: {}", stats.total.lemmas);
    println!(
        "  Indexing: {}",
        if stats.total.indexing { "running" } else { "idle" }
    );
    println!();

    println!("Sites:");
    for site in &stats.detailed {
        println!("  {} ({})", site.name, site.url);
        println!(
            "    Status: {} at {}",
            site.status,
            site.status_time.format("%Y-%m-%d %H:%M:%S")
        );
        println!("    Pages: {}, Lemmas: {}", site.pages, site.lemmas);
        if let Some(error) = &site.error {
            println!("    Error: {}", error);
        }
    }
}
