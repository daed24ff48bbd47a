//! State module for tracking indexing progress
//!
//! # Components
//!
//! - `SiteStatus`: Lifecycle of a site during an indexing run (indexing, indexed, failed)
//! - `CrawlOutcome`: Result of one node of a site's crawl tree

mod crawl_outcome;
mod site_status;

// Re-export main types
pub use crawl_outcome::CrawlOutcome;
pub use site_status::SiteStatus;
