//! Title resolution against a mocked MediaWiki API

use disamwiki::config::{ApiConfig, Config};
use disamwiki::wiki::{HttpWikiApi, Resolver};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_for(server: &MockServer) -> Resolver {
    let config = Config {
        api: ApiConfig {
            endpoint: format!("{}/w/api.php", server.uri()),
            ..ApiConfig::default()
        },
        ..Config::default()
    };
    Resolver::new(Arc::new(HttpWikiApi::new(&config).unwrap()))
}

fn titles(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_normalized_redirect_chain() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("titles", "quicksilver|Mercury"))
        .and(query_param("rvsection", "0"))
        .and(query_param("redirects", "1"))
        .and(query_param("formatversion", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "normalized": [{"from": "quicksilver", "to": "Quicksilver"}],
                "redirects": [{"from": "Quicksilver", "to": "Mercury (element)"}],
                "pages": {
                    "-1": {"ns": 0, "title": "Mercury", "missing": ""},
                    "3": {"pageid": 3, "ns": 0, "title": "Mercury (element)",
                          "revisions": [{"*": "A chemical element."}]}
                }
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = resolver_for(&mock_server)
        .resolve(&titles(&["quicksilver", "Mercury"]), Some(0))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].search_title, "quicksilver");
    assert_eq!(records[0].title, "Mercury (element)");
    assert_eq!(records[0].page_id, 3);
    assert_eq!(records[0].content.as_deref(), Some("A chemical element."));
    assert!(records[1].is_missing());
    assert_eq!(records[1].search_title, "Mercury");
}

#[tokio::test]
async fn test_redirect_into_section() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("titles", "Hg isotopes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "redirects": [{"from": "Hg isotopes", "to": "Mercury (element)", "tofragment": "Isotopes"}],
                "pages": {"3": {"pageid": 3, "title": "Mercury (element)", "revisions": [{"*": "Lead."}]}}
            }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "parse"))
        .and(query_param("prop", "sections"))
        .and(query_param("page", "Mercury (element)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parse": {
                "title": "Mercury (element)",
                "sections": [
                    {"index": "1", "line": "Properties"},
                    {"index": "4", "line": "Isotopes"}
                ]
            }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("titles", "Mercury (element)"))
        .and(query_param("rvsection", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pages": {"3": {"pageid": 3, "title": "Mercury (element)",
                                "revisions": [{"*": "== Isotopes ==\nSeven stable isotopes."}]}}
            }
        })))
        .mount(&mock_server)
        .await;

    let records = resolver_for(&mock_server)
        .resolve(&titles(&["Hg isotopes"]), Some(0))
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.search_title, "Hg isotopes");
    assert_eq!(record.title, "Mercury (element)#Isotopes");
    assert_eq!(record.page_id, 3);
    assert_eq!(
        record.content.as_deref(),
        Some("== Isotopes ==\nSeven stable isotopes.")
    );
}

#[tokio::test]
async fn test_fragment_of_missing_article_is_missing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}
        })))
        .mount(&mock_server)
        .await;

    let record = resolver_for(&mock_server)
        .resolve_fragment("Vulcan (planet)", "Orbit")
        .await
        .unwrap();

    assert!(record.is_missing());
    assert_eq!(record.title, "Vulcan (planet)#Orbit");
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;
    let agent = Config::default().user_agent.header_value();
    Mock::given(method("GET"))
        .and(header("user-agent", agent.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": {"-1": {"title": "Nothing", "missing": ""}}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = resolver_for(&mock_server)
        .resolve(&titles(&["Nothing"]), None)
        .await
        .unwrap();

    assert!(records[0].is_missing());
}
