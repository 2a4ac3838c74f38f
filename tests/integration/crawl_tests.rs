//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the public API.

use seedcrawl::config::{BackendKind, Config};
use seedcrawl::crawler::{traverse, FetchOutcome, Fetcher, TraversalLimits};
use seedcrawl::storage::{open_backend, Backend, FilesystemBackend};
use seedcrawl::{crawl_urls, Coordinator};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration storing everything under `dir`
fn create_test_config(dir: &Path, backend: BackendKind, max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.request_timeout = 5;
    config.storage.backend = backend;
    config.storage.path = dir.join("state");
    config.storage.database_path = dir.join("state").join("crawler.db");
    config.results.cache_path = dir.join("html_cache.db");
    config
}

async fn mount_page(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// A small restaurant site: home page, menu page, a PDF menu and an image
async fn mount_site(server: &MockServer) {
    let base_url = server.uri();

    mount_page(
        server,
        "/",
        &format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/menu.html">Menu</a>
            <a href="/about#team">About</a>
            <a href="/logo.png">Logo</a>
            <a href="https://facebook.com/restaurant">Facebook</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    mount_page(
        server,
        "/menu.html",
        r#"<html><body>
        <csaction val0="/speisekarte.pdf"></csaction>
        <a href="/">Home</a>
        </body></html>"#,
    )
    .await;

    mount_page(server, "/about", "<html><body>About us</body></html>").await;

    Mock::given(method("GET"))
        .and(path("/speisekarte.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 menu".to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let base_url = mock_server.uri();

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 3);

    let batch = crawl_urls(config, &[base_url.as_str()]).await.unwrap();

    assert_eq!(batch.results.len(), 1);
    let urls: Vec<&str> = batch.results[0]
        .documents
        .iter()
        .map(|d| d.url.as_str())
        .collect();

    assert_eq!(
        urls,
        vec![
            format!("{}/", base_url),
            format!("{}/menu.html", base_url),
            format!("{}/speisekarte.pdf", base_url),
            format!("{}/about", base_url),
        ]
    );
    assert!(batch.results[0].documents[2].is_pdf());
    assert_eq!(batch.summary.documents, 4);

    // Filesystem backend layout
    assert!(dir.path().join("state").join("cache").is_dir());
}

#[tokio::test]
async fn test_full_crawl_with_sqlite_backend() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Sqlite, 3);

    let batch = crawl_urls(config, &[mock_server.uri()]).await.unwrap();

    assert_eq!(batch.results[0].documents.len(), 4);
    assert!(dir.path().join("state").join("crawler.db").is_file());
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 2);

    let batch = crawl_urls(config, &[mock_server.uri()]).await.unwrap();

    // The PDF is three levels deep
    let documents = &batch.results[0].documents;
    assert_eq!(documents.len(), 3);
    assert!(documents.iter().all(|d| !d.is_pdf()));
}

#[tokio::test]
async fn test_zero_depth_returns_empty_result() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 0);

    let batch = crawl_urls(config, &[mock_server.uri()]).await.unwrap();

    assert_eq!(batch.results.len(), 1);
    assert!(batch.results[0].is_empty());
}

#[tokio::test]
async fn test_link_budget_of_one() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path(), BackendKind::Filesystem, 5);
    config.crawler.max_links = Some(1);

    let batch = crawl_urls(config, &[mock_server.uri()]).await.unwrap();

    assert_eq!(batch.results[0].documents.len(), 1);
}

#[tokio::test]
async fn test_second_run_served_from_content_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>cached</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 1);

    let first = crawl_urls(config.clone(), &[mock_server.uri()]).await.unwrap();
    // New process-level state, same directory on disk
    let second = crawl_urls(config, &[mock_server.uri()]).await.unwrap();

    assert_eq!(first.results, second.results);
    assert_eq!(second.results[0].documents[0].body, b"<html>cached</html>".to_vec());
}

#[tokio::test]
async fn test_fetch_twice_single_network_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 159, 146, 150]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let backend: Arc<dyn Backend> = Arc::new(FilesystemBackend::new(dir.path()).unwrap());
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 1);
    let fetcher = Fetcher::from_config(&config.crawler, backend).unwrap();

    let url = format!("{}/page.html", mock_server.uri());
    let first = fetcher.fetch(&url).await.unwrap();
    let second = fetcher.fetch(&url).await.unwrap();

    assert_eq!(first, FetchOutcome::Content(vec![0u8, 159, 146, 150]));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_empty_body_replaced_by_later_download() {
    for kind in [BackendKind::Filesystem, BackendKind::Sqlite] {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("real"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = create_test_config(dir.path(), kind, 1);
        let backend = open_backend(&config.storage).unwrap();
        let fetcher = Fetcher::from_config(&config.crawler, Arc::clone(&backend)).unwrap();

        let url = format!("{}/", mock_server.uri());
        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(fetcher.fetch(&url).await.unwrap());
        }

        assert_eq!(outcomes[0], FetchOutcome::Content(Vec::new()), "{}", kind);
        for outcome in &outcomes[1..] {
            assert_eq!(*outcome, FetchOutcome::Content(b"real".to_vec()), "{}", kind);
        }
        assert_eq!(backend.load_content(&url).unwrap(), Some(b"real".to_vec()));

        mock_server.verify().await;
    }
}

#[tokio::test]
async fn test_error_memoized_across_runs() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Sqlite, 2);

    let first = crawl_urls(config.clone(), &[mock_server.uri()]).await.unwrap();
    let second = crawl_urls(config.clone(), &[mock_server.uri()]).await.unwrap();

    assert!(first.results[0].is_empty());
    assert!(second.results[0].is_empty());

    let backend = open_backend(&config.storage).unwrap();
    assert!(backend.is_error(&format!("{}/", mock_server.uri())).unwrap());
}

#[tokio::test]
async fn test_redirected_seed_resolves_relative_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("Location", format!("{}/de/start/", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/de/start/", r#"<a href="karte.html">Karte</a>"#).await;
    mount_page(&mock_server, "/de/start/karte.html", "menu").await;
    Mock::given(method("GET"))
        .and(path("/karte.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 2);
    let backend = open_backend(&config.storage).unwrap();
    let fetcher = Fetcher::from_config(&config.crawler, Arc::clone(&backend)).unwrap();

    let result = traverse(&fetcher, &base_url, TraversalLimits::new(2, None))
        .await
        .unwrap();

    assert_eq!(result.documents.len(), 2);
    assert_eq!(
        result.documents[1].url,
        format!("{}/de/start/karte.html", base_url)
    );
    assert_eq!(
        backend.get_redirect(&format!("{}/", base_url)).unwrap(),
        format!("{}/de/start/", base_url)
    );
}

#[tokio::test]
async fn test_batch_continues_after_unreachable_seed() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<html>first</html>").await;

    let second_server = MockServer::start().await;
    mount_page(&second_server, "/", "<html>third</html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 1);
    let coordinator = Coordinator::new(config).unwrap();

    let seeds = vec![
        mock_server.uri(),
        "http://127.0.0.1:1/".to_string(),
        second_server.uri(),
    ];
    let batch = coordinator.run(&seeds).await;

    assert_eq!(batch.results.len(), 3);
    assert_eq!(batch.results[0].documents[0].body, b"<html>first</html>".to_vec());
    assert!(batch.results[1].is_empty());
    assert_eq!(batch.results[2].documents[0].body, b"<html>third</html>".to_vec());
}

#[tokio::test]
async fn test_result_cache_reused_between_runs() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path(), BackendKind::Filesystem, 3);
    config.results.cache_enabled = true;

    let first = crawl_urls(config.clone(), &[mock_server.uri()]).await.unwrap();
    assert_eq!(first.summary.cached, 0);

    // Limits no longer matter once the seed is in the result cache
    config.crawler.max_depth = 1;
    let second = crawl_urls(config, &[mock_server.uri()]).await.unwrap();

    assert_eq!(second.summary.cached, 1);
    assert_eq!(second.results, first.results);
    assert!(dir.path().join("html_cache.db").is_file());
}

#[tokio::test]
async fn test_seed_without_scheme() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<html>home</html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), BackendKind::Filesystem, 1);

    let bare = mock_server.uri().trim_start_matches("http://").to_string();
    let batch = crawl_urls(config, &[bare]).await.unwrap();

    assert_eq!(batch.results[0].seed, mock_server.uri());
    assert_eq!(batch.results[0].documents.len(), 1);
}
