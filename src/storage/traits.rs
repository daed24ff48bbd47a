//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::SiteStatus;
use crate::storage::{LemmaRecord, PageRecord, SiteRecord};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Page {path} of site {site_id} already exists")]
    DuplicatePage { site_id: i64, path: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawler,
/// the lemma index maintainer and the search engine.
pub trait Storage {
    // ===== Site Management =====

    /// Creates a site with the given status and the current timestamp
    fn create_site(&mut self, url: &str, name: &str, status: SiteStatus)
        -> StorageResult<SiteRecord>;

    /// Gets a site by ID
    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord>;

    /// Gets a site by its normalized root URL
    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>>;

    /// Gets all sites
    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    /// Sets the status and last error of a site and refreshes its status timestamp
    fn update_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> StorageResult<()>;

    /// Refreshes the status timestamp of a site
    fn touch_site(&mut self, site_id: i64) -> StorageResult<()>;

    /// Deletes the sites with the given URLs together with everything they own
    ///
    /// # Returns
    ///
    /// The number of deleted sites
    fn delete_sites_by_url(&mut self, urls: &[String]) -> StorageResult<usize>;

    // ===== Page Management =====

    /// Atomically inserts an empty placeholder page for (site, path)
    ///
    /// Fails with `StorageError::DuplicatePage` if the path is already stored.
    fn claim_page(&mut self, site_id: i64, path: &str) -> StorageResult<i64>;

    /// Inserts a fully fetched page
    fn insert_page(&mut self, site_id: i64, path: &str, code: u16, content: &str)
        -> StorageResult<i64>;

    /// Replaces the status code and content of a page
    fn update_page(&mut self, page_id: i64, code: u16, content: &str) -> StorageResult<()>;

    /// Gets a page by ID
    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    /// Gets a page by (site, path)
    fn find_page(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>>;

    /// Deletes a page and its postings
    fn delete_page(&mut self, page_id: i64) -> StorageResult<()>;

    /// Returns the subset of `paths` already stored for the site
    fn existing_paths(&self, site_id: i64, paths: &[String]) -> StorageResult<HashSet<String>>;

    /// Counts the pages of a site
    fn count_pages(&self, site_id: i64) -> StorageResult<u64>;

    // ===== Lemma Index =====

    /// Records the lemmas of a freshly stored page
    ///
    /// For every (lemma, count): creates the site's lemma with frequency 1 or
    /// increments its frequency by one, then stores a posting with rank = count.
    /// Runs as a single transaction.
    fn record_page_lemmas(
        &mut self,
        site_id: i64,
        page_id: i64,
        lemmas: &HashMap<String, u32>,
    ) -> StorageResult<()>;

    /// Removes the postings of a page
    ///
    /// Decrements the frequency of every lemma the page contributed and deletes
    /// lemmas whose frequency drops below one. Runs as a single transaction.
    ///
    /// # Returns
    ///
    /// The number of lemmas whose frequency was decremented
    fn deindex_page(&mut self, page_id: i64) -> StorageResult<usize>;

    /// Gets a lemma of a site
    fn find_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>>;

    /// Gets the lemmas of a site that appear in `lemmas`
    fn find_lemmas(&self, site_id: i64, lemmas: &[String]) -> StorageResult<Vec<LemmaRecord>>;

    /// Gets the IDs of all pages with a posting for the lemma
    fn pages_for_lemma(&self, lemma_id: i64) -> StorageResult<Vec<i64>>;

    /// Gets the IDs of the pages among `page_ids` with a posting for the lemma
    fn pages_for_lemma_among(&self, lemma_id: i64, page_ids: &[i64]) -> StorageResult<Vec<i64>>;

    /// Sums the ranks of the page's postings for the given lemmas
    fn sum_ranks(&self, page_id: i64, lemma_ids: &[i64]) -> StorageResult<f64>;

    /// Counts the lemmas of a site
    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64>;

    /// Counts the postings of a site
    fn count_indexes(&self, site_id: i64) -> StorageResult<u64>;
}
