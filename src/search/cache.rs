//! Repeat-query cache
//!
//! Holds the ranking of the most recent query only. A repeated query with the
//! same text and site filter reuses it, whatever its offset and limit.

use crate::search::Ranking;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    text: String,
    site: Option<String>,
}

/// One-entry cache of the last ranking
#[derive(Debug, Default)]
pub struct QueryCache {
    slot: Mutex<Option<(CacheKey, Arc<Ranking>)>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached ranking if it was computed for this text and site
    pub fn get(&self, text: &str, site: Option<&str>) -> Option<Arc<Ranking>> {
        let slot = self.slot.lock();
        match slot.as_ref() {
            Some((key, ranking)) if key.text == text && key.site.as_deref() == site => {
                Some(ranking.clone())
            }
            _ => None,
        }
    }

    /// Replaces the cached ranking
    pub fn put(&self, text: &str, site: Option<&str>, ranking: Arc<Ranking>) {
        let key = CacheKey {
            text: text.to_string(),
            site: site.map(str::to_string),
        };
        *self.slot.lock() = Some((key, ranking));
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_requires_same_text_and_site() {
        let cache = QueryCache::new();
        let ranking = Arc::new(Ranking::default());
        cache.put("cat", Some("https://a.com"), ranking.clone());

        assert!(cache.get("cat", Some("https://a.com")).is_some());
        assert!(cache.get("cat", None).is_none());
        assert!(cache.get("dog", Some("https://a.com")).is_none());
    }

    #[test]
    fn test_capacity_one() {
        let cache = QueryCache::new();
        cache.put("cat", None, Arc::new(Ranking::default()));
        cache.put("dog", None, Arc::new(Ranking::default()));

        assert!(cache.get("cat", None).is_none());
        assert!(cache.get("dog", None).is_some());

        cache.clear();
        assert!(cache.get("dog", None).is_none());
    }
}
