//! Indexing service
//!
//! Owns the lifecycle of indexing runs: at most one run is active at a time,
//! each run crawls every configured site concurrently, and a run can be
//! stopped cooperatively. Single pages can be (re)indexed outside a run.

use crate::config::Config;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::links::{is_within_site, normalize_page_url, normalize_site_url, relative_path};
use crate::crawler::node::{crawl_site, CrawlContext, SiteReport};
use crate::lemma::{LemmaIndexer, Lemmatizer};
use crate::search::SearchEngine;
use crate::state::SiteStatus;
use crate::storage::{SharedStorage, SiteRecord, Storage};
use crate::{LemmaSearchError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Starts, stops and supervises indexing runs
#[derive(Clone)]
pub struct IndexingService {
    config: Arc<Config>,
    storage: SharedStorage,
    indexer: LemmaIndexer,
    fetcher: HttpFetcher,
    /// Engine whose cached ranking is dropped whenever the index changes
    search: Arc<SearchEngine>,
    /// Run flag of the active run, if any
    active: Arc<Mutex<Option<Arc<AtomicBool>>>>,
}

/// Handle to a started indexing run
pub struct IndexingRun {
    running: Arc<AtomicBool>,
    supervisor: JoinHandle<Vec<SiteReport>>,
}

impl IndexingRun {
    /// Stops the run; equivalent to [`IndexingService::stop_indexing`]
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Waits for every site of the run to finish
    ///
    /// # Returns
    ///
    /// One report per configured site, in configuration order
    pub async fn wait(self) -> Result<Vec<SiteReport>> {
        self.supervisor
            .await
            .map_err(|e| LemmaSearchError::Task(e.to_string()))
    }
}

impl IndexingService {
    /// Creates a new indexing service
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `storage` - Shared storage handle
    /// * `lemmatizer` - Analyzer used for every indexed page
    pub fn new(config: Arc<Config>, storage: SharedStorage, lemmatizer: Lemmatizer) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.crawler).map_err(|source| LemmaSearchError::Http {
            url: String::new(),
            source,
        })?;

        Ok(Self {
            indexer: LemmaIndexer::new(storage.clone(), lemmatizer.clone()),
            search: Arc::new(SearchEngine::new(storage.clone(), lemmatizer)),
            config,
            storage,
            fetcher,
            active: Arc::new(Mutex::new(None)),
        })
    }

    /// Search engine over the same index
    ///
    /// Its repeat-query cache is cleared when a run starts or finishes and
    /// after every single-page index.
    pub fn search_engine(&self) -> Arc<SearchEngine> {
        self.search.clone()
    }

    /// Returns true while a run is active, including while a stopped run
    /// winds down
    pub fn is_indexing(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Starts indexing every configured site
    ///
    /// Stored sites with the configured URLs are deleted together with their
    /// pages, lemmas and postings, fresh `INDEXING` sites are created, and one
    /// crawl tree per site is spawned on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// * `AlreadyIndexing` - A run is active
    /// * `Storage` - The sites could not be reset
    pub fn start_indexing(&self) -> Result<IndexingRun> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(LemmaSearchError::AlreadyIndexing);
        }

        let sites = self.reset_sites()?;
        self.search.invalidate_cache();
        let running = Arc::new(AtomicBool::new(true));
        let fetch_permits = Arc::new(Semaphore::new(
            self.config.crawler.max_concurrent_fetches as usize,
        ));

        tracing::info!("Starting indexing of {} sites", sites.len());

        let mut handles = Vec::with_capacity(sites.len());
        for site in sites {
            let ctx = Arc::new(CrawlContext {
                site: site.clone(),
                storage: self.storage.clone(),
                indexer: self.indexer.clone(),
                fetcher: self.fetcher.clone(),
                running: running.clone(),
                fetch_permits: fetch_permits.clone(),
            });
            handles.push((site, tokio::spawn(crawl_site(ctx))));
        }

        let supervisor = tokio::spawn(supervise(
            handles,
            self.storage.clone(),
            self.search.clone(),
            self.active.clone(),
            running.clone(),
        ));

        *active = Some(running.clone());
        Ok(IndexingRun {
            running,
            supervisor,
        })
    }

    /// Stops the active run
    ///
    /// Fetches already in flight complete; no new page is fetched and the
    /// affected sites end `FAILED`.
    ///
    /// # Errors
    ///
    /// * `NotIndexing` - No run is active
    pub fn stop_indexing(&self) -> Result<()> {
        match self.active.lock().as_ref() {
            Some(running) => {
                running.store(false, Ordering::SeqCst);
                tracing::info!("Indexing stop requested");
                Ok(())
            }
            None => Err(LemmaSearchError::NotIndexing),
        }
    }

    /// Fetches and (re)indexes a single page
    ///
    /// The page must belong to a configured site. Its site row is created as
    /// `INDEXED` when missing. A previously stored copy of the page is removed
    /// from the index and replaced.
    ///
    /// # Errors
    ///
    /// * `PageOutsideSites` - No configured site contains the URL
    /// * `Http` - The page could not be fetched
    /// * `PageUnavailable` - The page answered with an error status
    pub async fn index_single_page(&self, url: &str) -> Result<()> {
        let normalized = normalize_page_url(url).ok_or_else(|| LemmaSearchError::PageOutsideSites {
            url: url.trim().to_string(),
        })?;
        let url = normalized.as_str();
        let (site_url, site_name) = self.configured_site_for(url)?;
        let path = relative_path(url).ok_or_else(|| LemmaSearchError::PageOutsideSites {
            url: url.to_string(),
        })?;

        let site = self.find_or_create_site(&site_url, &site_name)?;

        let page = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| LemmaSearchError::Http {
                url: url.to_string(),
                source,
            })?;
        if page.status >= 400 {
            return Err(LemmaSearchError::PageUnavailable {
                url: url.to_string(),
                status: page.status,
            });
        }

        let previous = self.storage.lock().find_page(site.id, &path)?;
        if let Some(previous) = previous {
            self.indexer.deindex_page(previous.id)?;
            self.storage.lock().delete_page(previous.id)?;
        }

        let page_id = self
            .storage
            .lock()
            .insert_page(site.id, &path, page.status, &page.body)?;
        let lemmas = self.indexer.index_page(site.id, page_id, &page.body)?;
        self.search.invalidate_cache();

        tracing::info!("Indexed page {} ({} lemmas)", url, lemmas);
        Ok(())
    }

    /// Deletes the configured sites and recreates them as `INDEXING`
    fn reset_sites(&self) -> Result<Vec<SiteRecord>> {
        let entries = self
            .config
            .sites
            .iter()
            .map(|entry| -> Result<(String, String)> {
                Ok((normalize_site_url(&entry.url)?, entry.name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let urls: Vec<String> = entries.iter().map(|(url, _)| url.clone()).collect();

        let mut storage = self.storage.lock();
        let deleted = storage.delete_sites_by_url(&urls)?;
        if deleted > 0 {
            tracing::info!("Deleted {} previously indexed sites", deleted);
        }

        let mut sites = Vec::with_capacity(entries.len());
        for (url, name) in entries {
            sites.push(storage.create_site(&url, &name, SiteStatus::Indexing)?);
        }
        Ok(sites)
    }

    fn configured_site_for(&self, url: &str) -> Result<(String, String)> {
        for entry in &self.config.sites {
            let site_url = normalize_site_url(&entry.url)?;
            if is_within_site(url, &site_url) {
                return Ok((site_url, entry.name.clone()));
            }
        }

        Err(LemmaSearchError::PageOutsideSites {
            url: url.to_string(),
        })
    }

    fn find_or_create_site(&self, url: &str, name: &str) -> Result<SiteRecord> {
        let mut storage = self.storage.lock();
        if let Some(site) = storage.find_site_by_url(url)? {
            return Ok(site);
        }
        Ok(storage.create_site(url, name, SiteStatus::Indexed)?)
    }
}

/// Joins every site task of a run and clears the run when all are done
async fn supervise(
    handles: Vec<(SiteRecord, JoinHandle<SiteReport>)>,
    storage: SharedStorage,
    search: Arc<SearchEngine>,
    active: Arc<Mutex<Option<Arc<AtomicBool>>>>,
    running: Arc<AtomicBool>,
) -> Vec<SiteReport> {
    let mut reports = Vec::with_capacity(handles.len());

    for (site, handle) in handles {
        let report = match handle.await {
            Ok(report) => report,
            Err(e) => {
                let message = e.to_string();
                tracing::error!("Crawl task for {} ended abnormally: {}", site.url, message);
                let recorded =
                    storage
                        .lock()
                        .update_site_status(site.id, SiteStatus::Failed, Some(&message));
                if let Err(e) = recorded {
                    tracing::error!("Failed to record status of site {}: {}", site.url, e);
                }
                SiteReport {
                    site_id: site.id,
                    url: site.url,
                    name: site.name,
                    status: SiteStatus::Failed,
                    error: Some(message),
                }
            }
        };
        reports.push(report);
    }

    search.invalidate_cache();
    {
        let mut active = active.lock();
        if active
            .as_ref()
            .map_or(false, |flag| Arc::ptr_eq(flag, &running))
        {
            *active = None;
        }
    }

    tracing::info!("Indexing finished");
    reports
}
