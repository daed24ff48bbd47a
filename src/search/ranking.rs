//! Relevance ranking helpers

use crate::storage::LemmaRecord;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Share of a site's pages above which a lemma is too common to narrow a query
pub const INFREQUENCY_FACTOR: f64 = 0.5;

/// A candidate page with its relative relevance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedPage {
    pub page_id: i64,
    pub site_id: i64,
    pub relevance: f64,
}

/// Result of ranking one query, before pagination
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// Distinct lemmas of the query text
    pub lemmas: HashSet<String>,
    /// Pages ordered by relevance, best first
    pub pages: Vec<RankedPage>,
}

/// Drops lemmas found on more than half of a site's pages
///
/// Lemmas are considered from most to least frequent and a lemma is only
/// dropped while at least one other lemma remains, so the result is never
/// empty when the input is not.
pub fn filter_low_selectivity(mut lemmas: Vec<LemmaRecord>, total_pages: u64) -> Vec<LemmaRecord> {
    let threshold = INFREQUENCY_FACTOR * total_pages as f64;
    lemmas.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let mut remaining = lemmas.len();
    let mut kept = Vec::with_capacity(lemmas.len());
    for lemma in lemmas {
        if remaining > 1 && f64::from(lemma.frequency) > threshold {
            remaining -= 1;
            tracing::debug!("Skipping common lemma '{}'", lemma.lemma);
            continue;
        }
        kept.push(lemma);
    }
    kept
}

/// Converts absolute relevance to relative relevance and orders pages
///
/// Relevance is divided by the maximum, so the best page scores 1.0. Ties
/// are ordered by page id.
pub fn order_by_relevance(mut pages: Vec<RankedPage>) -> Vec<RankedPage> {
    let max = pages.iter().map(|p| p.relevance).fold(0.0_f64, f64::max);
    if max > 0.0 {
        for page in &mut pages {
            page.relevance /= max;
        }
    }

    pages.sort_by_key(|p| p.page_id);
    pages.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(Ordering::Equal)
    });
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(id: i64, name: &str, frequency: u32) -> LemmaRecord {
        LemmaRecord {
            id,
            site_id: 1,
            lemma: name.to_string(),
            frequency,
        }
    }

    fn names(lemmas: &[LemmaRecord]) -> Vec<&str> {
        lemmas.iter().map(|l| l.lemma.as_str()).collect()
    }

    #[test]
    fn test_common_lemma_is_dropped() {
        let lemmas = vec![lemma(1, "cat", 10), lemma(2, "rare", 1)];
        let kept = filter_low_selectivity(lemmas, 10);
        assert_eq!(names(&kept), vec!["rare"]);
    }

    #[test]
    fn test_last_lemma_is_kept() {
        let kept = filter_low_selectivity(vec![lemma(1, "cat", 10)], 10);
        assert_eq!(names(&kept), vec!["cat"]);

        let kept = filter_low_selectivity(vec![lemma(1, "cat", 9), lemma(2, "dog", 10)], 10);
        assert_eq!(names(&kept), vec!["cat"]);
    }

    #[test]
    fn test_half_is_not_too_common() {
        let kept = filter_low_selectivity(vec![lemma(1, "cat", 5), lemma(2, "dog", 2)], 10);
        assert_eq!(names(&kept), vec!["cat", "dog"]);
    }

    #[test]
    fn test_filter_empty() {
        assert!(filter_low_selectivity(Vec::new(), 10).is_empty());
    }

    #[test]
    fn test_order_by_relevance() {
        let pages = vec![
            RankedPage { page_id: 3, site_id: 1, relevance: 2.0 },
            RankedPage { page_id: 1, site_id: 1, relevance: 8.0 },
            RankedPage { page_id: 2, site_id: 1, relevance: 2.0 },
        ];
        let ordered = order_by_relevance(pages);

        let ids: Vec<i64> = ordered.iter().map(|p| p.page_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ordered[0].relevance, 1.0);
        assert_eq!(ordered[1].relevance, 0.25);
        assert!(ordered.iter().all(|p| (0.0..=1.0).contains(&p.relevance)));
    }
}
