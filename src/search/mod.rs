//! Search and ranking
//!
//! Queries are reduced to lemmas with the same lemmatizer used for indexing.
//! Every query lemma must be present on a site for it to contribute pages;
//! pages are ranked by the summed term frequency of the matched lemmas,
//! relative to the best page.

mod cache;
mod engine;
mod ranking;
mod snippet;

pub use cache::QueryCache;
pub use engine::SearchEngine;
pub use ranking::{filter_low_selectivity, order_by_relevance, RankedPage, Ranking, INFREQUENCY_FACTOR};
pub use snippet::{snippet, SNIPPET_LENGTH};

use serde::Serialize;

/// A search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub offset: usize,
    pub limit: usize,
    /// Restricts the search to one site, given by its URL
    pub site: Option<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            offset: 0,
            limit,
            site: None,
        }
    }
}

/// One ranked page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub site: String,
    pub site_name: String,
    pub uri: String,
    pub title: String,
    pub snippet: String,
    /// Relevance relative to the best result, in `[0, 1]`
    pub relevance: f64,
}

/// A page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResponse {
    /// Number of ranked pages before pagination
    pub count: usize,
    pub results: Vec<SearchResult>,
}
