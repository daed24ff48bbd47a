//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! full indexing runs end-to-end.

use lemma_search::config::{
    Config, CrawlerConfig, LemmatizerConfig, SearchConfig, SiteEntry, StorageConfig,
};
use lemma_search::crawler::STOPPED_BY_USER;
use lemma_search::storage::{share, SharedStorage, SqliteStorage, Storage};
use lemma_search::{IndexingService, Lemmatizer, LemmaSearchError, SearchQuery, SiteStatus};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a single site
fn create_test_config(site_url: &str, max_concurrent_fetches: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            user_agent: "TestBot/1.0".to_string(),
            referrer: Some("https://www.example.org".to_string()),
            delay_ms: 0,
            follow_redirects: true,
            max_concurrent_fetches,
        },
        storage: StorageConfig {
            database_path: ":memory:".to_string(),
        },
        lemmatizer: LemmatizerConfig {
            language: "english".to_string(),
        },
        search: SearchConfig::default(),
        sites: vec![SiteEntry {
            url: site_url.to_string(),
            name: "Test Site".to_string(),
        }],
    }
}

fn create_service(config: Config) -> (IndexingService, SharedStorage) {
    let storage = share(SqliteStorage::new_in_memory().expect("Failed to open storage"));
    let lemmatizer =
        Lemmatizer::from_config(&config.lemmatizer).expect("Failed to build lemmatizer");
    let service = IndexingService::new(Arc::new(config), storage.clone(), lemmatizer)
        .expect("Failed to create service");
    (service, storage)
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mutually_linked_pages_are_stored_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links = format!(
        r#"<a href="/">Home</a> <a href="/a">A</a> <a href="{}/b">B</a> <a href="/c.html">C</a>"#,
        base_url
    );
    for (page, title) in [("/", "Home"), ("/a", "A"), ("/b", "B"), ("/c.html", "C")] {
        mount_page(
            &mock_server,
            page,
            format!(
                "<html><head><title>{}</title></head><body><p>Cats chase mice.</p>{}</body></html>",
                title, links
            ),
        )
        .await;
    }

    let (service, storage) = create_service(create_test_config(&base_url, 8));
    let run = service.start_indexing().expect("Failed to start indexing");
    let reports = run.wait().await.expect("Run failed");

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, SiteStatus::Indexed);
    assert_eq!(reports[0].error, None);
    assert!(!service.is_indexing());

    let storage = storage.lock();
    let site = storage
        .find_site_by_url(&base_url)
        .unwrap()
        .expect("Site should exist");
    assert_eq!(site.status, SiteStatus::Indexed);
    assert_eq!(storage.count_pages(site.id).unwrap(), 4);

    for page in ["/", "/a", "/b", "/c.html"] {
        let stored = storage.find_page(site.id, page).unwrap();
        assert_eq!(stored.map(|p| p.code), Some(200), "page {}", page);
    }

    // Every page contains "cat" once, so the lemma is on four pages
    let cat = storage.find_lemma(site.id, "cat").unwrap().unwrap();
    assert_eq!(cat.frequency, 4);
}

#[tokio::test]
async fn test_error_pages_are_recorded_without_index() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><p>Home page</p><a href="/missing">Missing</a><a href="/logo.png">Logo</a></body></html>"#
            .to_string(),
    )
    .await;

    let (service, storage) = create_service(create_test_config(&base_url, 2));
    let reports = service.start_indexing().unwrap().wait().await.unwrap();
    assert_eq!(reports[0].status, SiteStatus::Indexed);

    let storage = storage.lock();
    let site = storage.find_site_by_url(&base_url).unwrap().unwrap();

    // The image link is never followed
    assert_eq!(storage.count_pages(site.id).unwrap(), 2);

    let missing = storage.find_page(site.id, "/missing").unwrap().unwrap();
    assert_eq!(missing.code, 404);
    assert!(missing.content.is_empty());

    // Only the home page has postings, one per lemma
    let lemmas = storage.count_lemmas(site.id).unwrap();
    assert!(lemmas > 0);
    assert_eq!(storage.count_indexes(site.id).unwrap(), lemmas);
}

#[tokio::test]
async fn test_unreachable_site_records_server_error() {
    // Nothing listens on port 1
    let base_url = "http://127.0.0.1:1".to_string();

    let (service, storage) = create_service(create_test_config(&base_url, 1));
    let reports = service.start_indexing().unwrap().wait().await.unwrap();
    assert_eq!(reports[0].status, SiteStatus::Indexed);

    let storage = storage.lock();
    let site = storage.find_site_by_url(&base_url).unwrap().unwrap();
    let root = storage.find_page(site.id, "/").unwrap().unwrap();
    assert_eq!(root.code, 500);
}

#[tokio::test]
async fn test_stop_interrupts_pending_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/slow{}">Slow {}</a>"#, i, i))
        .collect();
    mount_page(
        &mock_server,
        "/",
        format!("<html><body><p>Index</p>{}</body></html>", links),
    )
    .await;

    Mock::given(method("GET"))
        .and(path_regex("^/slow[0-9]+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Slow page</p></body></html>")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let (service, storage) = create_service(create_test_config(&base_url, 1));
    let run = service.start_indexing().unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(service.is_indexing());
    service.stop_indexing().expect("Run should be active");

    let reports = run.wait().await.unwrap();
    assert_eq!(reports[0].status, SiteStatus::Failed);
    assert_eq!(reports[0].error.as_deref(), Some(STOPPED_BY_USER));

    let storage = storage.lock();
    let site = storage.find_site_by_url(&base_url).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Failed);
    assert_eq!(site.last_error.as_deref(), Some(STOPPED_BY_USER));

    // The root page was persisted before the stop; not every child was
    let pages = storage.count_pages(site.id).unwrap();
    assert!(pages >= 1);
    assert!(pages < 6);
}

#[tokio::test]
async fn test_start_and_stop_guards() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Slow</body></html>")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let (service, _storage) = create_service(create_test_config(&base_url, 1));
    assert!(matches!(
        service.stop_indexing(),
        Err(LemmaSearchError::NotIndexing)
    ));

    let run = service.start_indexing().unwrap();
    assert!(matches!(
        service.start_indexing(),
        Err(LemmaSearchError::AlreadyIndexing)
    ));

    run.wait().await.unwrap();
    assert!(!service.is_indexing());
    assert!(matches!(
        service.stop_indexing(),
        Err(LemmaSearchError::NotIndexing)
    ));
}

#[tokio::test]
async fn test_index_single_page_replaces_previous_version() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/news",
        "<html><body><p>Cats and dogs</p></body></html>".to_string(),
    )
    .await;

    let (service, storage) = create_service(create_test_config(&base_url, 2));
    let page_url = format!("{}/news", base_url);
    service
        .index_single_page(&page_url)
        .await
        .expect("First indexing failed");

    {
        let storage = storage.lock();
        let site = storage.find_site_by_url(&base_url).unwrap().unwrap();
        assert_eq!(site.status, SiteStatus::Indexed);
        assert!(storage.find_lemma(site.id, "dog").unwrap().is_some());
    }

    mock_server.reset().await;
    mount_page(
        &mock_server,
        "/news",
        "<html><body><p>Cats only</p></body></html>".to_string(),
    )
    .await;

    service
        .index_single_page(&page_url)
        .await
        .expect("Reindexing failed");

    let storage = storage.lock();
    let site = storage.find_site_by_url(&base_url).unwrap().unwrap();
    assert_eq!(storage.count_pages(site.id).unwrap(), 1);
    assert!(storage.find_lemma(site.id, "dog").unwrap().is_none());

    let cat = storage.find_lemma(site.id, "cat").unwrap().unwrap();
    assert_eq!(cat.frequency, 1);

    let page = storage.find_page(site.id, "/news").unwrap().unwrap();
    assert!(page.content.contains("Cats only"));
}

#[tokio::test]
async fn test_index_single_page_refreshes_search_results() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/news",
        "<html><body><p>Cats and dogs</p></body></html>".to_string(),
    )
    .await;

    let (service, _storage) = create_service(create_test_config(&base_url, 2));
    let engine = service.search_engine();
    let page_url = format!("{}/news", base_url);

    service.index_single_page(&page_url).await.unwrap();
    let dogs = SearchQuery::new("dogs", 10);
    assert_eq!(engine.search(&dogs).unwrap().count, 1);

    mock_server.reset().await;
    mount_page(
        &mock_server,
        "/news",
        "<html><body><p>Cats only</p></body></html>".to_string(),
    )
    .await;

    service.index_single_page(&page_url).await.unwrap();
    assert_eq!(engine.search(&dogs).unwrap().count, 0);
}

#[tokio::test]
async fn test_index_single_page_normalizes_site_part() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/news",
        "<html><body><p>Cats and dogs</p></body></html>".to_string(),
    )
    .await;

    let (service, storage) = create_service(create_test_config(&base_url, 2));
    let page_url = format!("HTTP://{}/news", mock_server.address());
    service
        .index_single_page(&page_url)
        .await
        .expect("Upper-case scheme should match the configured site");

    let storage = storage.lock();
    let site = storage.find_site_by_url(&base_url).unwrap().unwrap();
    assert!(storage.find_page(site.id, "/news").unwrap().is_some());
}

#[tokio::test]
async fn test_index_single_page_rejections() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let (service, _storage) = create_service(create_test_config(&base_url, 2));

    let outside = service.index_single_page("https://elsewhere.example/page").await;
    assert!(matches!(
        outside,
        Err(LemmaSearchError::PageOutsideSites { .. })
    ));

    let missing = service
        .index_single_page(&format!("{}/missing", base_url))
        .await;
    assert!(matches!(
        missing,
        Err(LemmaSearchError::PageUnavailable { status: 404, .. })
    ));
}
