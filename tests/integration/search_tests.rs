//! Integration tests for search and ranking
//!
//! These tests seed an in-memory index through the lemma indexer and run
//! queries against it.

use lemma_search::config::LemmatizerConfig;
use lemma_search::storage::{share, SharedStorage, SqliteStorage, Storage};
use lemma_search::{
    LemmaIndexer, LemmaSearchError, Lemmatizer, SearchEngine, SearchQuery, SiteStatus,
};

const SITE_A: &str = "https://cats.example";
const SITE_B: &str = "https://pets.example";

fn lemmatizer() -> Lemmatizer {
    Lemmatizer::from_config(&LemmatizerConfig {
        language: "english".to_string(),
    })
    .expect("Failed to build lemmatizer")
}

fn add_page(indexer: &LemmaIndexer, storage: &SharedStorage, site_id: i64, path: &str, html: &str) {
    let page_id = storage
        .lock()
        .insert_page(site_id, path, 200, html)
        .expect("Failed to insert page");
    indexer
        .index_page(site_id, page_id, html)
        .expect("Failed to index page");
}

/// Ten pages that all mention cats; only `/page3` is rare
fn seed() -> (SharedStorage, Lemmatizer) {
    let storage = share(SqliteStorage::new_in_memory().expect("Failed to open storage"));
    let lemmatizer = lemmatizer();
    let indexer = LemmaIndexer::new(storage.clone(), lemmatizer.clone());

    let site = storage
        .lock()
        .create_site(SITE_A, "Cats", SiteStatus::Indexed)
        .unwrap();
    for i in 1..=10 {
        let extra = if i == 3 { " A rare cat appeared." } else { "" };
        let html = format!(
            "<html><head><title>Page {}</title></head><body><p>The cat sat here.{}</p></body></html>",
            i, extra
        );
        add_page(&indexer, &storage, site.id, &format!("/page{}", i), &html);
    }

    storage
        .lock()
        .create_site(SITE_B, "Pets", SiteStatus::Indexed)
        .unwrap();

    (storage, lemmatizer)
}

fn query(text: &str) -> SearchQuery {
    SearchQuery::new(text, 20)
}

#[test]
fn test_common_lemma_is_skipped() {
    let (storage, lemmatizer) = seed();
    let engine = SearchEngine::new(storage, lemmatizer);

    let response = engine.search(&query("cat rare")).unwrap();
    assert_eq!(response.count, 1);

    let result = &response.results[0];
    assert_eq!(result.uri, "/page3");
    assert_eq!(result.title, "Page 3");
    assert_eq!(result.site, SITE_A);
    assert_eq!(result.site_name, "Cats");
    assert_eq!(result.relevance, 1.0);
    assert!(result.snippet.contains("<b>rare</b>"));
}

#[test]
fn test_relevance_is_relative_to_best_page() {
    let (storage, lemmatizer) = seed();
    let engine = SearchEngine::new(storage, lemmatizer);

    let response = engine.search(&query("cats")).unwrap();
    assert_eq!(response.count, 10);

    // Page 3 mentions the cat twice
    assert_eq!(response.results[0].uri, "/page3");
    assert_eq!(response.results[0].relevance, 1.0);
    assert!(response
        .results
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.relevance)));
    assert_eq!(response.results[1].relevance, 0.5);
    assert!(response.results[0].snippet.contains("<b>cat</b>"));
}

#[test]
fn test_pagination() {
    let (storage, lemmatizer) = seed();
    let engine = SearchEngine::new(storage, lemmatizer);

    let mut paged = query("cat");
    paged.offset = 8;
    paged.limit = 5;
    let response = engine.search(&paged).unwrap();
    assert_eq!(response.count, 10);
    assert_eq!(response.results.len(), 2);

    paged.offset = 0;
    paged.limit = 3;
    let response = engine.search(&paged).unwrap();
    assert_eq!(response.count, 10);
    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0].uri, "/page3");
}

#[test]
fn test_repeated_query_reuses_cached_ranking() {
    let (storage, lemmatizer) = seed();
    let indexer = LemmaIndexer::new(storage.clone(), lemmatizer.clone());
    let engine = SearchEngine::new(storage.clone(), lemmatizer);

    let mut paged = query("cat");
    assert_eq!(engine.search(&paged).unwrap().count, 10);

    let site_id = storage
        .lock()
        .find_site_by_url(SITE_A)
        .unwrap()
        .unwrap()
        .id;
    add_page(
        &indexer,
        &storage,
        site_id,
        "/page11",
        "<html><body><p>Another cat.</p></body></html>",
    );

    // Same text with another window: the earlier ranking is served as is
    paged.offset = 5;
    paged.limit = 2;
    let response = engine.search(&paged).unwrap();
    assert_eq!(response.count, 10);
    assert_eq!(response.results.len(), 2);
    assert!(response.results.iter().all(|r| r.uri != "/page11"));

    engine.invalidate_cache();
    assert_eq!(engine.search(&query("cat")).unwrap().count, 11);
}

#[test]
fn test_missing_lemma_yields_no_results() {
    let (storage, lemmatizer) = seed();
    let engine = SearchEngine::new(storage, lemmatizer);

    let response = engine.search(&query("cat unicorn")).unwrap();
    assert_eq!(response.count, 0);
    assert!(response.results.is_empty());
}

#[test]
fn test_function_words_only_query_is_empty() {
    let (storage, lemmatizer) = seed();
    let engine = SearchEngine::new(storage, lemmatizer);

    let response = engine.search(&query("and or but")).unwrap();
    assert_eq!(response.count, 0);
}

#[test]
fn test_empty_query() {
    let (storage, lemmatizer) = seed();
    let engine = SearchEngine::new(storage, lemmatizer);

    assert!(matches!(
        engine.search(&query("  ")),
        Err(LemmaSearchError::EmptyQuery)
    ));
}

#[test]
fn test_site_filter() {
    let (storage, lemmatizer) = seed();
    let engine = SearchEngine::new(storage, lemmatizer);

    let mut filtered = query("rare");
    filtered.site = Some(format!("{}/", SITE_A));
    let response = engine.search(&filtered).unwrap();
    assert_eq!(response.count, 1);

    // Known site without postings
    filtered.site = Some(SITE_B.to_string());
    assert!(matches!(
        engine.search(&filtered),
        Err(LemmaSearchError::NotIndexedSite { site: Some(_) })
    ));

    // Unknown site
    filtered.site = Some("https://unknown.example".to_string());
    assert!(matches!(
        engine.search(&filtered),
        Err(LemmaSearchError::NotIndexedSite { site: Some(_) })
    ));
}

#[test]
fn test_results_merge_across_sites() {
    let (storage, lemmatizer) = seed();
    let indexer = LemmaIndexer::new(storage.clone(), lemmatizer.clone());
    let site_b = storage.lock().find_site_by_url(SITE_B).unwrap().unwrap();
    add_page(
        &indexer,
        &storage,
        site_b.id,
        "/rare",
        "<html><head><title>Rare pets</title></head><body>Rare rare rare.</body></html>",
    );

    let engine = SearchEngine::new(storage, lemmatizer);
    let response = engine.search(&query("rare")).unwrap();
    assert_eq!(response.count, 2);

    let best = &response.results[0];
    assert_eq!(best.site, SITE_B);
    assert_eq!(best.title, "Rare pets");
    assert_eq!(best.relevance, 1.0);
    assert!(response.results[1].relevance < 1.0);
}

#[test]
fn test_snippet_without_match_is_page_prefix() {
    let lemmatizer = lemmatizer();
    let words = "lorem ipsum dolor sit amet ".repeat(20);
    let html = format!("<html><body><p>{}</p></body></html>", words.trim_end());

    let lemmas = lemmatizer.lemma_set("zebra");
    let snippet = lemma_search::search::snippet(&html, &lemmatizer, &lemmas);

    assert_eq!(snippet.chars().count(), 200);
    assert!(words.starts_with(&snippet));
}
