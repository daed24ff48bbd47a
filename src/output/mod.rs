//! Output module for statistics and console reports
//!
//! This module handles:
//! - Collecting per-site index statistics
//! - Printing statistics, search results and indexing reports

mod results;
pub mod stats;

pub use results::{print_search_results, print_site_reports};
pub use stats::{
    collect_statistics, print_statistics, DetailedStatistics, Statistics, TotalStatistics,
    NOT_STARTED_ERROR,
};
