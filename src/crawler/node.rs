//! Crawl tree
//!
//! Each node claims one page of a site, fetches and indexes it, then crawls
//! its new child links in parallel and waits for all of them. A node that
//! sees the run flag cleared before it fetches resolves as interrupted, so
//! stopping a run drains the tree without aborting in-flight requests.

use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::links::extract_child_paths;
use crate::lemma::LemmaIndexer;
use crate::state::{CrawlOutcome, SiteStatus};
use crate::storage::{SharedStorage, SiteRecord, Storage, StorageError};
use crate::{LemmaSearchError, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Error recorded on a site whose run was stopped
pub const STOPPED_BY_USER: &str = "Indexing stopped by user";

/// Status code recorded for pages that could not be fetched at all
const TRANSPORT_FAILURE_STATUS: u16 = 500;

type NodeFuture = Pin<Box<dyn Future<Output = Result<CrawlOutcome>> + Send>>;

/// Everything a crawl node needs, built once per site per run
pub struct CrawlContext {
    /// Snapshot of the site taken when the run started
    pub site: SiteRecord,
    pub storage: SharedStorage,
    pub indexer: LemmaIndexer,
    pub fetcher: HttpFetcher,
    /// Cleared to stop the run
    pub running: Arc<AtomicBool>,
    /// Bounds concurrent fetches across every site of the run
    pub fetch_permits: Arc<Semaphore>,
}

impl CrawlContext {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Final state of one site's crawl
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReport {
    pub site_id: i64,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub error: Option<String>,
}

/// Crawls a whole site from its root and records the final site status
///
/// A completed tree marks the site `INDEXED`; an interrupted one marks it
/// `FAILED` with [`STOPPED_BY_USER`]; any error escaping the tree marks it
/// `FAILED` with that error's message.
pub async fn crawl_site(ctx: Arc<CrawlContext>) -> SiteReport {
    let site = ctx.site.clone();
    tracing::info!("Crawling site {} ({})", site.name, site.url);

    let (status, error) = match crawl_node(ctx.clone(), "/".to_string()).await {
        Ok(CrawlOutcome::Completed) => (SiteStatus::Indexed, None),
        Ok(CrawlOutcome::Interrupted) => (SiteStatus::Failed, Some(STOPPED_BY_USER.to_string())),
        Err(e) => (SiteStatus::Failed, Some(e.to_string())),
    };

    let recorded = ctx
        .storage
        .lock()
        .update_site_status(site.id, status, error.as_deref());
    if let Err(e) = recorded {
        tracing::error!("Failed to record status of site {}: {}", site.url, e);
    }

    match &error {
        Some(message) => tracing::error!("Site {} failed: {}", site.url, message),
        None => tracing::info!("Site {} indexed", site.url),
    }

    SiteReport {
        site_id: site.id,
        url: site.url,
        name: site.name,
        status,
        error,
    }
}

/// Crawls one page and, recursively, its children
pub fn crawl_node(ctx: Arc<CrawlContext>, path: String) -> NodeFuture {
    Box::pin(async move {
        if !ctx.is_running() {
            return Ok(CrawlOutcome::Interrupted);
        }

        let children = {
            let _permit = ctx
                .fetch_permits
                .acquire()
                .await
                .map_err(|e| LemmaSearchError::Task(e.to_string()))?;

            // The run may have been stopped while waiting for a permit
            if !ctx.is_running() {
                return Ok(CrawlOutcome::Interrupted);
            }

            let claimed = ctx.storage.lock().claim_page(ctx.site.id, &path);
            let page_id = match claimed {
                Ok(page_id) => page_id,
                Err(StorageError::DuplicatePage { .. }) => {
                    tracing::debug!("Page {} already claimed", path);
                    return Ok(CrawlOutcome::Completed);
                }
                Err(e) => return Err(e.into()),
            };

            let children = visit_page(&ctx, page_id, &path).await?;
            ctx.storage.lock().touch_site(ctx.site.id)?;
            children
        };

        let mut tasks = JoinSet::new();
        for child in children {
            tasks.spawn(crawl_node(ctx.clone(), child));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| LemmaSearchError::Task(e.to_string()))??;
            outcomes.push(outcome);
        }

        Ok(CrawlOutcome::fold(outcomes))
    })
}

/// Fetches a claimed page, stores and indexes it, and returns the child
/// paths not yet known to storage
async fn visit_page(ctx: &CrawlContext, page_id: i64, path: &str) -> Result<Vec<String>> {
    let site = &ctx.site;
    let url = format!("{}{}", site.url, path);
    tracing::debug!("Fetching {}", url);

    let page = match ctx.fetcher.fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", url, e);
            ctx.storage
                .lock()
                .update_page(page_id, TRANSPORT_FAILURE_STATUS, "")?;
            return Ok(Vec::new());
        }
    };

    if page.status >= 400 {
        tracing::warn!("Page {} returned HTTP {}", url, page.status);
        ctx.storage.lock().update_page(page_id, page.status, "")?;
        return Ok(Vec::new());
    }

    ctx.storage
        .lock()
        .update_page(page_id, page.status, &page.body)?;
    ctx.indexer.index_page(site.id, page_id, &page.body)?;

    let links = extract_child_paths(&page.body, &site.url);
    let known = ctx.storage.lock().existing_paths(site.id, &links)?;

    Ok(links
        .into_iter()
        .filter(|link| !known.contains(link))
        .collect())
}
