//! Transport-level tests for the catalog client
//!
//! Runs the full pipeline (rate limiter, cache, retry loop, normalization)
//! against a wiremock catalog, verifying exact request counts.

use serde_json::json;
use std::time::Duration;
use verdant_catalog::{CatalogClient, CatalogConfig, RetryPolicy};
use verdant_core::{CannabinoidContent, Genetics};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at the mock server with millisecond backoffs so retry
/// sequences finish quickly.
fn test_config(server: &MockServer) -> CatalogConfig {
    CatalogConfig::default()
        .with_base_url(server.uri())
        .with_rate_limit(1000, Duration::from_secs(60))
        .with_request_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy {
            max_retries: 3,
            backoff_base: Duration::from_millis(1),
            rate_limit_base: Duration::from_millis(1),
            rate_limit_cap: Duration::from_millis(8),
        })
}

fn northern_lights() -> serde_json::Value {
    json!({
        "id": 456,
        "name": "Northern Lights",
        "race": "Indica",
        "thc": "18-22%",
        "cbd": 0.1,
        "flowering_type": "Photoperiod",
        "lineage": {"parents": [{"name": "Afghani"}, {"name": "Thai"}]}
    })
}

#[tokio::test]
async fn test_fetch_by_name_normalizes_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .and(query_param("name", "Northern Lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [northern_lights()]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let record = client.fetch_by_name("Northern Lights").await.unwrap();

    assert_eq!(record.name, "Northern Lights");
    assert_eq!(record.genetics, Genetics { indica: 100, sativa: 0 });
    assert!(!record.autoflower);
    assert_eq!(record.thc_content, Some(CannabinoidContent::Unparsed));
    assert_eq!(record.cbd_content, Some(CannabinoidContent::Value(0.1)));
    assert_eq!(record.parent_1.as_deref(), Some("Afghani"));
    assert_eq!(record.parent_2.as_deref(), Some("Thai"));
    assert_eq!(record.external_id, "cannabis_api");
    assert_eq!(record.external_id_value, "456");
}

#[tokio::test]
async fn test_second_fetch_hits_cache_not_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [northern_lights()]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let first = client.fetch_by_name("Northern Lights").await;
    let second = client.fetch_by_name("Northern Lights").await;

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [northern_lights()]})))
        .expect(2)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    client.fetch_by_name("Northern Lights").await;
    client.clear_cache();
    client.fetch_by_name("Northern Lights").await;

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_three_500s_then_200_succeeds_in_four_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [northern_lights()]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let record = client.fetch_by_name("Northern Lights").await;

    assert!(record.is_some());
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_retry_budget_exhaustion_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let results = client.search_by_type("indica").await;

    assert!(results.is_empty());
    // retries = 3 means exactly 4 attempts, then surrender.
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_429_then_200_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"strains": [northern_lights()]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let record = client.fetch_by_name("Northern Lights").await;

    assert!(record.is_some());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_404_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let record = client.fetch_by_name("Ghost Strain").await;

    assert!(record.is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_no_data_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let record = client.fetch_by_name("Anything").await;

    assert!(record.is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [northern_lights()]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    assert!(client.fetch_by_name("Northern Lights").await.is_none());
    // The 404 was not cached, so the next call reaches the network and succeeds.
    assert!(client.fetch_by_name("Northern Lights").await.is_some());
}

#[tokio::test]
async fn test_empty_query_performs_no_request() {
    let server = MockServer::start().await;
    let client = CatalogClient::new(test_config(&server));

    assert!(client.fetch_by_name("   ").await.is_none());
    assert!(client.search_by_type("").await.is_empty());
    assert!(client.search_by_effect(" \t ").await.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_bare_list_response_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .and(query_param("type", "sativa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Durban Poison", "race": "Sativa"},
            {"id": 2, "name": "Jack Herer", "race": "sativa 55% / indica 45%"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let results = client.search_by_type("sativa").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].genetics, Genetics { indica: 0, sativa: 100 });
    assert_eq!(results[1].genetics, Genetics { indica: 45, sativa: 55 });
}

#[tokio::test]
async fn test_bare_object_response_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(northern_lights()))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let record = client.fetch_by_name("Northern Lights").await;
    assert!(record.is_some());
}

#[tokio::test]
async fn test_records_without_id_skipped_in_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"name": "No Id Strain", "race": "Indica"},
            {"id": 7, "name": "Kosher Kush", "race": "Indica"}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server));
    let results = client.search_by_type("indica").await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Kosher Kush");
    assert_eq!(results[0].external_id_value, "7");
}

#[tokio::test]
async fn test_bearer_header_sent_when_api_key_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/strains"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(test_config(&server).with_api_key("test-key"));
    let results = client.search_by_effect("relaxed").await;
    assert!(results.is_empty());
}
