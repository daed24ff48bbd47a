//! Crawler module for site crawling and indexing runs
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the configured politeness settings
//! - Child link discovery and same-site rules
//! - The parallel crawl tree of one site
//! - Indexing run lifecycle and single-page indexing

mod fetcher;
mod links;
mod node;
mod service;

pub use fetcher::{build_http_client, FetchedPage, HttpFetcher};
pub use links::{
    extract_child_paths, is_valid_child_link, is_within_site, normalize_page_url,
    normalize_site_url, relative_path,
};
pub use node::{crawl_node, crawl_site, CrawlContext, SiteReport, STOPPED_BY_USER};
pub use service::{IndexingRun, IndexingService};
