//! Tests for the search backend transport

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry_client(uri: &str, max_retries: u32) -> ElasticClient {
    let config = ElasticConfig::builder(uri)
        .max_retries(max_retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .build()
        .unwrap();
    ElasticClient::new(config).unwrap()
}

#[test]
fn test_elastic_config_defaults() {
    let config = ElasticConfig::new("http://localhost:9200").unwrap();
    assert_eq!(config.base_url.as_str(), "http://localhost:9200/");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.backoff_type, BackoffType::Exponential);
    assert!(config.default_headers.is_empty());
}

#[test]
fn test_elastic_config_builder() {
    let config = ElasticConfig::builder("https://search.internal:9200")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .header("Authorization", "ApiKey abc123")
        .user_agent("indexer/2.0")
        .build()
        .unwrap();

    assert_eq!(config.base_url.as_str(), "https://search.internal:9200/");
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(
        config.default_headers.get("Authorization"),
        Some(&"ApiKey abc123".to_string())
    );
    assert_eq!(config.user_agent, "indexer/2.0");
}

#[test]
fn test_elastic_config_rejects_invalid_url() {
    let result = ElasticConfig::builder("not a url").build();
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn test_search_with_index_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/aws_resources/_search"))
        .and(body_json(json!({ "size": 10, "query": { "match_all": {} } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": { "total": { "value": 1, "relation": "eq" }, "hits": [
                { "_index": "aws_resources", "_id": "r1", "_source": { "arn": "a" } }
            ]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let body = json!({ "size": 10, "query": { "match_all": {} } });
    let response = client.search(Some("aws_resources"), &body).await.unwrap();

    assert_eq!(response["hits"]["hits"][0]["_id"], "r1");
}

#[tokio::test]
async fn test_search_without_index_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pit_id": "pit-9",
            "hits": { "hits": [] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let body = json!({ "size": 10, "query": { "match_all": {} }, "pit": { "id": "pit-9", "keep_alive": "1m" } });
    let response = client.search(None, &body).await.unwrap();

    assert_eq!(response["pit_id"], "pit-9");
}

#[tokio::test]
async fn test_open_pit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compliance_findings/_pit"))
        .and(query_param("keep_alive", "1m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "pit-abc" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let id = client.open_pit("compliance_findings", "1m").await.unwrap();

    assert_eq!(id, "pit-abc");
}

#[tokio::test]
async fn test_open_pit_response_without_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/things/_pit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let result = client.open_pit("things", "1m").await;

    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[tokio::test]
async fn test_open_pit_missing_index() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ghost/_pit"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "type": "index_not_found_exception",
                "reason": "no such index [ghost]",
                "index": "ghost"
            },
            "status": 404
        })))
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let err = client.open_pit("ghost", "1m").await.unwrap_err();

    assert!(err.is_index_not_found());
    assert!(matches!(err, Error::IndexNotFound { index } if index == "ghost"));
}

#[tokio::test]
async fn test_search_missing_index_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ghost/_search"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "index_not_found_exception", "index": "ghost" },
            "status": 404
        })))
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let err = client
        .search(Some("ghost"), &json!({ "size": 1, "query": { "match_all": {} } }))
        .await
        .unwrap_err();

    assert!(err.is_index_not_found());
}

#[tokio::test]
async fn test_plain_404_stays_a_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/things/_search"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no handler"))
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let err = client
        .search(Some("things"), &json!({ "size": 1, "query": { "match_all": {} } }))
        .await
        .unwrap_err();

    assert!(!err.is_index_not_found());
    assert!(matches!(err, Error::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_close_pit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/_pit"))
        .and(body_json(json!({ "id": "pit-abc" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "succeeded": true, "num_freed": 1 })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    client.close_pit("pit-abc").await.unwrap();
}

#[tokio::test]
async fn test_close_pit_expired_id_is_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/_pit"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "succeeded": false, "num_freed": 0 })),
        )
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    client.close_pit("pit-gone").await.unwrap();
}

#[tokio::test]
async fn test_retry_on_500_then_success() {
    let mock_server = MockServer::start().await;

    // First two calls return 500, third succeeds
    Mock::given(method("POST"))
        .and(path("/flaky/_search"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/flaky/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_retry_client(&mock_server.uri(), 3);
    let response = client
        .search(Some("flaky"), &json!({ "size": 1, "query": { "match_all": {} } }))
        .await
        .unwrap();

    assert_eq!(response["hits"]["hits"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_throttled_retry_honors_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/busy/_search"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_string("throttled"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/busy/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_retry_client(&mock_server.uri(), 2);
    let started = std::time::Instant::now();
    client
        .search(Some("busy"), &json!({ "size": 1, "query": { "match_all": {} } }))
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_retries_exhausted_surfaces_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/down/_search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = fast_retry_client(&mock_server.uri(), 2);
    let err = client
        .search(Some("down"), &json!({ "size": 1, "query": { "match_all": {} } }))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_default_headers_applied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("Authorization", "ApiKey secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cluster_name": "dev" })))
        .mount(&mock_server)
        .await;

    let config = ElasticConfig::builder(mock_server.uri())
        .header("Authorization", "ApiKey secret")
        .build()
        .unwrap();
    let client = ElasticClient::new(config).unwrap();
    let info = client.ping().await.unwrap();

    assert_eq!(info["cluster_name"], "dev");
}

#[tokio::test]
async fn test_ping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cluster_name": "search-prod",
            "version": { "number": "8.14.0" }
        })))
        .mount(&mock_server)
        .await;

    let client = ElasticClient::from_url(mock_server.uri()).unwrap();
    let info = client.ping().await.unwrap();

    assert_eq!(info["cluster_name"], "search-prod");
}

#[test]
fn test_calculate_backoff_constant() {
    let config = ElasticConfig::builder("http://localhost:9200")
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(100),
            Duration::from_secs(10),
        )
        .build()
        .unwrap();
    let client = ElasticClient::new(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let config = ElasticConfig::builder("http://localhost:9200")
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(100),
            Duration::from_secs(10),
        )
        .build()
        .unwrap();
    let client = ElasticClient::new(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential_respects_max() {
    let config = ElasticConfig::builder("http://localhost:9200")
        .backoff(
            BackoffType::Exponential,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
        .build()
        .unwrap();
    let client = ElasticClient::new(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(client.calculate_backoff(10), Duration::from_millis(500));
}
