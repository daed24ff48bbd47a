//! Search engine
//!
//! Resolves a query into lemmas, intersects postings per site, ranks the
//! candidate pages and renders the requested page of results.

use crate::crawler::normalize_site_url;
use crate::lemma::Lemmatizer;
use crate::search::cache::QueryCache;
use crate::search::ranking::{filter_low_selectivity, order_by_relevance, RankedPage, Ranking};
use crate::search::snippet::snippet;
use crate::search::{SearchQuery, SearchResponse, SearchResult};
use crate::storage::{SharedStorage, SiteRecord, Storage};
use crate::text::extract_title;
use crate::{LemmaSearchError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Answers ranked free-text queries against the index
pub struct SearchEngine {
    storage: SharedStorage,
    lemmatizer: Lemmatizer,
    cache: QueryCache,
}

impl SearchEngine {
    pub fn new(storage: SharedStorage, lemmatizer: Lemmatizer) -> Self {
        Self {
            storage,
            lemmatizer,
            cache: QueryCache::new(),
        }
    }

    /// Runs a search
    ///
    /// # Errors
    ///
    /// * `EmptyQuery` - The query text is blank
    /// * `NotIndexedSite` - The site filter names an unknown site, or none
    ///   of the candidate sites has any postings
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        if query.text.trim().is_empty() {
            return Err(LemmaSearchError::EmptyQuery);
        }

        let ranking = match self.cache.get(&query.text, query.site.as_deref()) {
            Some(ranking) => {
                tracing::debug!("Reusing ranking of repeated query '{}'", query.text);
                ranking
            }
            None => {
                let ranking = Arc::new(self.rank(query)?);
                self.cache
                    .put(&query.text, query.site.as_deref(), ranking.clone());
                ranking
            }
        };

        let results = self.render(&ranking, query.offset, query.limit)?;
        Ok(SearchResponse {
            count: ranking.pages.len(),
            results,
        })
    }

    /// Drops the cached ranking, e.g. after the index changed
    pub fn invalidate_cache(&self) {
        self.cache.clear();
    }

    fn rank(&self, query: &SearchQuery) -> Result<Ranking> {
        let sites = self.target_sites(query.site.as_deref())?;
        let lemmas = self.lemmatizer.lemma_set(&query.text);
        if lemmas.is_empty() {
            return Ok(Ranking::default());
        }

        let lemma_list: Vec<String> = lemmas.iter().cloned().collect();
        let mut candidates: HashMap<i64, (i64, Vec<i64>)> = HashMap::new();
        for site in &sites {
            for (page_id, lemma_ids) in self.site_candidates(site, &lemma_list)? {
                candidates.insert(page_id, (site.id, lemma_ids));
            }
        }
        tracing::debug!(
            "Query '{}': {} lemmas, {} candidate pages",
            query.text,
            lemmas.len(),
            candidates.len()
        );

        let storage = self.storage.lock();
        let mut pages = Vec::with_capacity(candidates.len());
        for (page_id, (site_id, lemma_ids)) in candidates {
            pages.push(RankedPage {
                page_id,
                site_id,
                relevance: storage.sum_ranks(page_id, &lemma_ids)?,
            });
        }

        Ok(Ranking {
            lemmas,
            pages: order_by_relevance(pages),
        })
    }

    /// Sites a query runs against
    fn target_sites(&self, filter: Option<&str>) -> Result<Vec<SiteRecord>> {
        let storage = self.storage.lock();

        let sites = match filter {
            Some(filter) => {
                let not_indexed = || LemmaSearchError::NotIndexedSite {
                    site: Some(filter.to_string()),
                };
                let url = normalize_site_url(filter).map_err(|_| not_indexed())?;
                vec![storage.find_site_by_url(&url)?.ok_or_else(not_indexed)?]
            }
            None => storage.list_sites()?,
        };

        let mut indexed = false;
        for site in &sites {
            if storage.count_indexes(site.id)? > 0 {
                indexed = true;
                break;
            }
        }
        if !indexed {
            return Err(LemmaSearchError::NotIndexedSite {
                site: filter.map(str::to_string),
            });
        }

        Ok(sites)
    }

    /// Pages of one site containing every query lemma, each with the ids of
    /// the lemmas that rank it
    fn site_candidates(
        &self,
        site: &SiteRecord,
        lemmas: &[String],
    ) -> Result<Vec<(i64, Vec<i64>)>> {
        let storage = self.storage.lock();

        let found = storage.find_lemmas(site.id, lemmas)?;
        if found.len() < lemmas.len() {
            return Ok(Vec::new());
        }

        let total_pages = storage.count_pages(site.id)?;
        let mut selective = filter_low_selectivity(found, total_pages);
        selective.sort_by_key(|lemma| lemma.frequency);

        let mut pages: Vec<i64> = Vec::new();
        for (i, lemma) in selective.iter().enumerate() {
            pages = if i == 0 {
                storage.pages_for_lemma(lemma.id)?
            } else {
                storage.pages_for_lemma_among(lemma.id, &pages)?
            };
            if pages.is_empty() {
                break;
            }
        }

        let lemma_ids: Vec<i64> = selective.iter().map(|lemma| lemma.id).collect();
        Ok(pages
            .into_iter()
            .map(|page_id| (page_id, lemma_ids.clone()))
            .collect())
    }

    fn render(&self, ranking: &Ranking, offset: usize, limit: usize) -> Result<Vec<SearchResult>> {
        let selected: Vec<RankedPage> = ranking
            .pages
            .iter()
            .skip(offset)
            .take(limit)
            .copied()
            .collect();

        let mut sites: HashMap<i64, SiteRecord> = HashMap::new();
        let mut results = Vec::with_capacity(selected.len());

        for ranked in selected {
            let (page, site) = {
                let storage = self.storage.lock();
                let page = storage.get_page(ranked.page_id)?;
                let site = match sites.get(&ranked.site_id) {
                    Some(site) => site.clone(),
                    None => storage.get_site(ranked.site_id)?,
                };
                (page, site)
            };
            sites.entry(site.id).or_insert_with(|| site.clone());

            results.push(SearchResult {
                title: extract_title(&page.content).unwrap_or_default(),
                snippet: snippet(&page.content, &self.lemmatizer, &ranking.lemmas),
                site: site.url,
                site_name: site.name,
                uri: page.path,
                relevance: ranked.relevance,
            });
        }

        Ok(results)
    }
}
