//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the MediaWiki API and run the full
//! crawl-then-write cycle end-to-end into a temporary directory.

use disamwiki::config::{ApiConfig, Config, CrawlerConfig, OutputConfig};
use disamwiki::crawler::{crawl, CrawlOutcome};
use disamwiki::output::{write_output, MISSING_PAGE_TEXT};
use disamwiki::{DisamError, HttpWikiApi, ResolveError};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, output_dir: &Path, max_depth: usize) -> Config {
    Config {
        api: ApiConfig {
            endpoint: format!("{}/w/api.php", server.uri()),
            ..ApiConfig::default()
        },
        crawler: CrawlerConfig {
            max_depth,
            workers: 3,
            progress: false,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            directory: output_dir.to_path_buf(),
            overwrite: false,
            graph_path: None,
        },
        ..Config::default()
    }
}

fn page(id: i64, title: &str, content: &str) -> (String, Value) {
    (
        id.to_string(),
        json!({"pageid": id, "ns": 0, "title": title, "revisions": [{"*": content}]}),
    )
}

fn missing(id: i64, title: &str) -> (String, Value) {
    (id.to_string(), json!({"ns": 0, "title": title, "missing": ""}))
}

fn query_body(normalized: Value, redirects: Value, pages: Vec<(String, Value)>) -> Value {
    let pages: serde_json::Map<String, Value> = pages.into_iter().collect();
    json!({
        "batchcomplete": "",
        "query": {"normalized": normalized, "redirects": redirects, "pages": pages}
    })
}

async fn mount_query(server: &MockServer, titles: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("titles", titles))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn run(config: &Config, term: &str) -> Result<CrawlOutcome, DisamError> {
    let api = Arc::new(HttpWikiApi::new(config)?);
    crawl(config, api, term).await
}

fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).expect("file should exist")
}

/// Mounts a two-level Mercury wiki: the disambiguation page, its three targets
/// (one via normalization, one missing) and one grandchild
async fn mount_mercury(server: &MockServer) {
    mount_query(
        server,
        "Mercury (disambiguation)",
        query_body(
            json!([]),
            json!([]),
            vec![page(
                1,
                "Mercury (disambiguation)",
                "'''Mercury''' may refer to:\n\
                 * [[Mercury (planet)|the planet]]\n\
                 * [[mercury (element)]], a metal\n\
                 * [[Vulcan (planet)]]\n\
                 == See also ==\n\
                 * [[Freddie Mercury]]",
            )],
        ),
    )
    .await;

    mount_query(
        server,
        "Mercury (planet)|mercury (element)|Vulcan (planet)",
        query_body(
            json!([{"from": "mercury (element)", "to": "Mercury (element)"}]),
            json!([]),
            vec![
                missing(-1, "Vulcan (planet)"),
                page(2, "Mercury (planet)", "The smallest planet, orbiting the [[Sun]]."),
                page(3, "Mercury (element)", "A chemical element."),
            ],
        ),
    )
    .await;

    mount_query(
        server,
        "Sun",
        query_body(json!([]), json!([]), vec![page(4, "Sun", "The star.")]),
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_writes_hierarchy() {
    let mock_server = MockServer::start().await;
    mount_mercury(&mock_server).await;
    let out = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, out.path(), 2);

    let outcome = run(&config, "Mercury").await.unwrap();
    let CrawlOutcome::Completed { tree, .. } = outcome else {
        panic!("disambiguation page should resolve");
    };
    assert_eq!(tree.len(), 5);

    let files = write_output(&tree, &config.output).unwrap();
    assert_eq!(files.len(), 5);

    let base = out.path().join("Mercury_(disambiguation)");
    let root_text = read(base.join("Mercury_(disambiguation).txt"));
    assert!(root_text.starts_with("Mercury may refer to:"));
    assert!(root_text.contains("== See also =="));
    assert!(!root_text.contains("Freddie"));

    assert_eq!(
        read(base.join("the_planet").join("Mercury_(planet).txt")),
        "The smallest planet, orbiting the Sun."
    );
    assert_eq!(
        read(base.join("the_planet").join("Sun").join("Sun.txt")),
        "The star."
    );
    assert_eq!(
        read(base.join("mercury_(element)").join("Mercury_(element).txt")),
        "A chemical element."
    );
    assert_eq!(
        read(base.join("Vulcan_(planet)").join("Vulcan_(planet).txt")),
        MISSING_PAGE_TEXT
    );
}

#[tokio::test]
async fn test_depth_zero_only_requests_the_seed() {
    let mock_server = MockServer::start().await;
    mount_mercury(&mock_server).await;
    let out = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, out.path(), 0);

    let outcome = run(&config, "Mercury").await.unwrap();

    assert_eq!(outcome.tree().map(|t| t.len()), Some(1));
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_missing_disambiguation_page() {
    let mock_server = MockServer::start().await;
    mount_query(
        &mock_server,
        "Xyzzy (disambiguation)",
        query_body(json!([]), json!([]), vec![missing(-1, "Xyzzy (disambiguation)")]),
    )
    .await;
    let out = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, out.path(), 2);

    let outcome = run(&config, "Xyzzy").await.unwrap();

    assert!(matches!(outcome, CrawlOutcome::NotFound { ref term } if term == "Xyzzy"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_api_error_aborts_crawl() {
    let mock_server = MockServer::start().await;
    mount_query(
        &mock_server,
        "Mercury (disambiguation)",
        json!({"error": {"code": "maxlag", "info": "Waiting for a database server"}}),
    )
    .await;
    let out = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, out.path(), 2);

    let result = run(&config, "Mercury").await;

    assert!(matches!(
        result,
        Err(DisamError::Resolve(ResolveError::Api { ref code, .. })) if code == "maxlag"
    ));
}

#[tokio::test]
async fn test_http_error_status_aborts_crawl() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    let out = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, out.path(), 2);

    let result = run(&config, "Mercury").await;

    assert!(matches!(
        result,
        Err(DisamError::Resolve(ResolveError::Status { status: 503, .. }))
    ));
}

#[tokio::test]
async fn test_second_run_collides_unless_overwriting() {
    let mock_server = MockServer::start().await;
    mount_mercury(&mock_server).await;
    let out = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server, out.path(), 1);

    let first = run(&config, "Mercury").await.unwrap();
    write_output(first.tree().unwrap(), &config.output).unwrap();

    let second = run(&config, "Mercury").await.unwrap();
    let err = write_output(second.tree().unwrap(), &config.output).unwrap_err();
    let expected = out
        .path()
        .join("Mercury_(disambiguation)")
        .join("Mercury_(disambiguation).txt");
    assert!(matches!(err, DisamError::FileCollision { ref path } if *path == expected));

    config.output.overwrite = true;
    assert!(write_output(second.tree().unwrap(), &config.output).is_ok());
}
