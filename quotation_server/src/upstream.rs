//! Single-attempt fetch of the USD-BRL quotation from the upstream provider.
//!
//! The provider answers `{"USDBRL": {...}}`. The HTTP status is not checked:
//! an error document from the provider simply fails to match the expected
//! shape and surfaces as `QuotationError::Decode`.
use std::time::Duration;

use log::debug;
use quotation_common::{Quotation, QuotationError, Result};
use serde::Deserialize;

/// Default upstream URL for the USD-BRL pair.
pub const UPSTREAM_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL/";

/// Largest upstream body accepted; the real payload is well under 1 KiB.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Envelope keyed by the currency-pair code.
#[derive(Debug, Deserialize)]
struct UpstreamEnvelope {
    #[serde(rename = "USDBRL")]
    usdbrl: Quotation,
}

/// HTTP client bound to one upstream URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: String,
}

impl UpstreamClient {
    /// Create a client for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Upstream URL this client fetches from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch one quotation, giving up once `deadline` has elapsed.
    ///
    /// Connection, DNS, body read and deadline failures are
    /// `QuotationError::Transport`; a body that does not match the envelope or
    /// exceeds `MAX_BODY_BYTES` is `QuotationError::Decode`. No retry.
    pub async fn fetch(&self, deadline: Duration) -> Result<Quotation> {
        let body = tokio::time::timeout(deadline, self.fetch_body())
            .await
            .map_err(|_| QuotationError::Transport(QuotationError::deadline_message(deadline)))??;
        debug!("Upstream answered with {} bytes", body.len());

        decode_envelope(&body)
    }

    async fn fetch_body(&self) -> Result<Vec<u8>> {
        let mut response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| QuotationError::Transport(e.to_string()))?;
        debug!("Upstream status: {}", response.status());
        if response
            .content_length()
            .is_some_and(|len| len > MAX_BODY_BYTES as u64)
        {
            return Err(oversized_body());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| QuotationError::Transport(e.to_string()))?
        {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(oversized_body());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn oversized_body() -> QuotationError {
    QuotationError::Decode(format!("upstream body exceeds {} bytes", MAX_BODY_BYTES))
}

/// Decode the provider envelope into the nested `Quotation`.
pub fn decode_envelope(body: &[u8]) -> Result<Quotation> {
    let envelope: UpstreamEnvelope = serde_json::from_slice(body)?;
    Ok(envelope.usdbrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURE: &str = r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","high":"5.2790","low":"5.2198","varBid":"0.0213","pctChange":"0.41","bid":"5.25","ask":"5.2510","timestamp":"1700000000","create_date":"2023-11-14 19:13:20"}}"#;

    async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/last/USD-BRL/"))
            .respond_with(response)
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(format!("{}/json/last/USD-BRL/", server.uri()))
    }

    #[tokio::test]
    async fn test_fetch_decodes_nested_quotation() {
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(FIXTURE)).await;

        let quotation = client_for(&server)
            .fetch(Duration::from_secs(2))
            .await
            .expect("fetch should succeed");

        assert_eq!(quotation.code, "USD");
        assert_eq!(quotation.base_code, "BRL");
        assert_eq!(quotation.bid, "5.25");
        assert_eq!(quotation.variation, "0.0213");
    }

    #[tokio::test]
    async fn test_fetch_past_deadline_is_transport_error() {
        let server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(FIXTURE)
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let result = client_for(&server).fetch(Duration::from_millis(50)).await;

        match result {
            Err(QuotationError::Transport(msg)) => assert_eq!(msg, "deadline of 50ms exceeded"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_decode_error() {
        let server =
            create_mock_server(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

        let result = client_for(&server).fetch(Duration::from_secs(2)).await;

        assert!(matches!(result, Err(QuotationError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_error_document_is_decode_error() {
        let server = create_mock_server(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"status":404,"code":"CoinNotExists","message":"moeda nao encontrada"}"#),
        )
        .await;

        let result = client_for(&server).fetch(Duration::from_secs(2)).await;

        assert!(matches!(result, Err(QuotationError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = UpstreamClient::new(format!("http://127.0.0.1:{port}/json/last/USD-BRL/"));
        let result = client.fetch(Duration::from_secs(2)).await;

        assert!(matches!(result, Err(QuotationError::Transport(_))));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let server = create_mock_server(
            ResponseTemplate::new(200).set_body_string("a".repeat(MAX_BODY_BYTES + 1)),
        )
        .await;

        let result = client_for(&server).fetch(Duration::from_secs(2)).await;

        match result {
            Err(QuotationError::Decode(msg)) => {
                assert_eq!(msg, "upstream body exceeds 65536 bytes")
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_envelope_requires_pair_key() {
        let result = decode_envelope(br#"{"EURBRL":{}}"#);
        assert!(matches!(result, Err(QuotationError::Decode(_))));
    }
}
