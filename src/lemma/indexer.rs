//! Inverted index maintenance
//!
//! Every page enters and leaves the index through this type, whether it was
//! reached by a crawl or submitted on its own.

use crate::lemma::Lemmatizer;
use crate::storage::{SharedStorage, Storage};
use crate::text::strip_markup;
use crate::Result;

/// Keeps lemma frequencies and postings in step with stored pages
#[derive(Clone)]
pub struct LemmaIndexer {
    storage: SharedStorage,
    lemmatizer: Lemmatizer,
}

impl LemmaIndexer {
    pub fn new(storage: SharedStorage, lemmatizer: Lemmatizer) -> Self {
        Self {
            storage,
            lemmatizer,
        }
    }

    /// Adds a stored page's lemmas to the index
    ///
    /// Each lemma's site frequency grows by one and a posting with the
    /// lemma's occurrence count as rank is created. All rows are written in
    /// one transaction.
    ///
    /// # Returns
    ///
    /// The number of distinct lemmas indexed for the page
    pub fn index_page(&self, site_id: i64, page_id: i64, html: &str) -> Result<usize> {
        let statistics = self.lemmatizer.lemma_statistics(&strip_markup(html));

        self.storage
            .lock()
            .record_page_lemmas(site_id, page_id, &statistics)?;

        tracing::debug!(
            "Indexed page {} of site {}: {} lemmas",
            page_id,
            site_id,
            statistics.len()
        );
        Ok(statistics.len())
    }

    /// Removes a page's contribution from the index
    ///
    /// Lemma frequencies drop by one and lemmas no longer present on any page
    /// are deleted, together with the page's postings, in one transaction.
    pub fn deindex_page(&self, page_id: i64) -> Result<usize> {
        let removed = self.storage.lock().deindex_page(page_id)?;
        tracing::debug!("Deindexed page {}: {} lemmas", page_id, removed);
        Ok(removed)
    }
}
