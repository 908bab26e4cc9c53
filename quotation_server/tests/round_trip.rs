//! End-to-end chain: upstream (mocked) → server → SQLite → client → output file.
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use quotation_client::output::OUTPUT_FILE;
use quotation_server::config::Deadlines;
use quotation_server::http::{QuotationServer, serve};
use quotation_server::store::SqliteStore;
use quotation_server::upstream::UpstreamClient;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPSTREAM_FIXTURE: &str = r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","high":"5.2790","low":"5.2198","varBid":"0.0213","pctChange":"0.41","bid":"5.25","ask":"5.2510","timestamp":"1700000000","create_date":"2023-11-14 19:13:20"}}"#;

const CLIENT_BUDGET: Duration = Duration::from_secs(2);

async fn create_upstream(response: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/last/USD-BRL/"))
        .respond_with(response)
        .expect(1)
        .mount(&mock_server)
        .await;
    mock_server
}

const RELAXED: Deadlines = Deadlines {
    fetch: Duration::from_millis(500),
    persist: Duration::from_secs(1),
};

/// Starts a server on an ephemeral port and returns its endpoint URL.
async fn start_server(upstream: &MockServer, store: SqliteStore) -> String {
    start_server_with(upstream, store, RELAXED).await
}

async fn start_server_with(upstream: &MockServer, store: SqliteStore, deadlines: Deadlines) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let server = QuotationServer::new(
        UpstreamClient::new(format!("{}/json/last/USD-BRL/", upstream.uri())),
        Arc::new(store),
    )
    .with_deadlines(deadlines);
    tokio::spawn(serve(listener, server));
    format!("http://{addr}/cotacao")
}

async fn migrated_store(dir: &Path) -> SqliteStore {
    let store = SqliteStore::new(dir.join("quotation.sqlite"));
    store.migrate().await.unwrap();
    store
}

#[test_log::test(tokio::test)]
async fn test_fixture_bid_reaches_output_file() {
    let upstream =
        create_upstream(ResponseTemplate::new(200).set_body_string(UPSTREAM_FIXTURE)).await;
    let dir = tempfile::tempdir().unwrap();
    let store = migrated_store(dir.path()).await;
    let url = start_server(&upstream, store.clone()).await;
    let output = dir.path().join(OUTPUT_FILE);

    quotation_client::run(&url, &output, CLIENT_BUDGET)
        .await
        .expect("client run should succeed");

    assert_eq!(fs::read_to_string(&output).unwrap(), "Dólar: 5.25");
    let records = store.records().await.unwrap();
    info!("Stored records: {records:?}");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].quotation.bid, "5.25");
    assert_eq!(records[0].quotation.code, "USD");
    assert_eq!(records[0].quotation.base_code, "BRL");
    assert_eq!(records[0].quotation.variation, "0.0213");
}

#[test_log::test(tokio::test)]
async fn test_server_response_matches_stored_record() {
    let upstream =
        create_upstream(ResponseTemplate::new(200).set_body_string(UPSTREAM_FIXTURE)).await;
    let dir = tempfile::tempdir().unwrap();
    let store = migrated_store(dir.path()).await;
    let url = start_server(&upstream, store.clone()).await;

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: quotation_common::Quotation = response.json().await.unwrap();

    let records = store.records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].quotation, body);
}

#[test_log::test(tokio::test)]
async fn test_upstream_failure_writes_nothing_anywhere() {
    let upstream = create_upstream(ResponseTemplate::new(200).set_body_string("not json")).await;
    let dir = tempfile::tempdir().unwrap();
    let store = migrated_store(dir.path()).await;
    let url = start_server(&upstream, store.clone()).await;
    let output = dir.path().join(OUTPUT_FILE);

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Erro ao consultar cotação!" }));

    assert!(store.records().await.unwrap().is_empty());
    assert!(!output.exists());
}

#[test_log::test(tokio::test)]
async fn test_storage_failure_fails_client_without_output() {
    let upstream =
        create_upstream(ResponseTemplate::new(200).set_body_string(UPSTREAM_FIXTURE)).await;
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("missing").join("quotation.sqlite"));
    let url = start_server(&upstream, store).await;
    let output = dir.path().join(OUTPUT_FILE);

    let err = quotation_client::run(&url, &output, CLIENT_BUDGET)
        .await
        .unwrap_err();

    assert_eq!(quotation_client::failure_message(&err), "Erro ao buscar cotacao!");
    assert!(!output.exists());
}

#[test_log::test(tokio::test)]
async fn test_expired_write_deadline_reports_failure_and_stores_nothing() {
    let upstream =
        create_upstream(ResponseTemplate::new(200).set_body_string(UPSTREAM_FIXTURE)).await;
    let dir = tempfile::tempdir().unwrap();
    let store = migrated_store(dir.path()).await;
    let deadlines = Deadlines {
        persist: Duration::ZERO,
        ..RELAXED
    };
    let url = start_server_with(&upstream, store.clone(), deadlines).await;

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Erro ao gravar cotação!" }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.records().await.unwrap().is_empty());
}
